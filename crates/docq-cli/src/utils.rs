//! Shared display helpers used by both interactive modes

use std::path::PathBuf;

use docq_api::{IndexStatus, KnowledgeItem, KnowledgeStats, PresetQuestion, QaHistory, SearchResponse};
use docq_session::ConversationRecord;

/// Truncate a string to `max` characters, appending "..." if truncated.
/// Operates on Unicode char boundaries, not bytes.
pub fn truncate_chars(s: &str, max: usize) -> String {
    let mut chars = s.chars();
    let truncated: String = chars.by_ref().take(max).collect();
    if chars.next().is_some() {
        format!("{}...", truncated)
    } else {
        truncated
    }
}

/// Format a byte count for display.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * 1024;
    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}

/// Comma-join knowledge entry ids for display.
pub fn join_ids(ids: &[i64]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// One line per knowledge entry: id, title, tags, then a summary preview.
pub fn format_knowledge_items(items: &[KnowledgeItem]) -> String {
    let mut out = String::new();
    for item in items {
        out.push_str(&format!("  [{}] {}", item.id, item.title));
        let tags = item.tag_list();
        if !tags.is_empty() {
            out.push_str(&format!("  ({})", tags.join(", ")));
        }
        out.push('\n');
        if let Some(summary) = item.summary.as_deref() {
            let preview = truncate_chars(summary, 100).replace('\n', " ");
            out.push_str(&format!("       {}\n", preview));
        }
    }
    out
}

pub fn format_search(response: &SearchResponse) -> String {
    if response.knowledge_items.is_empty() {
        return format!("No matches for \"{}\".", response.query);
    }
    format!(
        "{} of {} matches for \"{}\":\n\n{}",
        response.knowledge_items.len(),
        response.total,
        response.query,
        format_knowledge_items(&response.knowledge_items)
    )
}

pub fn format_history(history: &QaHistory) -> String {
    if history.history.is_empty() {
        return "No stored answers yet.".to_string();
    }
    let mut out = format!(
        "Stored answers ({} of {}):\n\n",
        history.history.len(),
        history.total
    );
    for record in &history.history {
        out.push_str(&format!(
            "  [{}] {}  {}\n",
            record.id,
            record.created_at.format("%Y-%m-%d %H:%M"),
            truncate_chars(&record.question, 70).replace('\n', " ")
        ));
        out.push_str(&format!(
            "       {}\n",
            truncate_chars(&record.answer, 100).replace('\n', " ")
        ));
    }
    out.push_str("\nRate one with /feedback <id> up|down.");
    out
}

pub fn format_stats(stats: &KnowledgeStats) -> String {
    let mut out = String::from("Knowledge base statistics:\n");
    out.push_str(&format!(
        "  Entries:  {} total, {} active\n",
        stats.total_knowledge, stats.active_knowledge
    ));
    out.push_str(&format!("  Answers:  {} stored\n", stats.total_qa));
    if !stats.popular_tags.is_empty() {
        out.push_str(&format!("  Popular tags: {}\n", stats.popular_tags.join(", ")));
    }
    if !stats.recent_questions.is_empty() {
        out.push_str("  Recent questions:\n");
        for question in &stats.recent_questions {
            out.push_str(&format!("    - {}\n", truncate_chars(question, 80)));
        }
    }
    out
}

pub fn format_presets(presets: &[PresetQuestion]) -> String {
    if presets.is_empty() {
        return "No preset questions available.".to_string();
    }
    let mut out = String::from("Preset questions:\n");
    for (i, preset) in presets.iter().enumerate() {
        match preset.category.as_deref() {
            Some(category) => {
                out.push_str(&format!("  {}. {}  ({})\n", i + 1, preset.question, category))
            }
            None => out.push_str(&format!("  {}. {}\n", i + 1, preset.question)),
        }
    }
    out.push_str("\nAsk one with /preset <number>.");
    out
}

pub fn format_index_status(status: &IndexStatus) -> String {
    let mut out = String::from("Graph index status:\n");
    out.push_str(&format!(
        "  Service available:  {}\n",
        if status.graphrag_available { "yes" } else { "no" }
    ));
    out.push_str(&format!(
        "  API key configured: {}\n",
        if status.api_key_configured { "yes" } else { "no" }
    ));
    if status.index_exists {
        match status.artifact_count {
            Some(count) => out.push_str(&format!("  Index built:        yes ({} artifacts)\n", count)),
            None => out.push_str("  Index built:        yes\n"),
        }
        if let Some(modified) = status.last_modified {
            let updated = chrono::DateTime::from_timestamp(modified as i64, 0)
                .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                .unwrap_or_else(|| "unknown".to_string());
            out.push_str(&format!("  Last updated:       {}\n", updated));
        }
    } else {
        out.push_str("  Index built:        no (build one with /graphrag build)\n");
    }
    out.push_str(&format!("  Workspace:          {}", status.workspace_path));
    out
}

/// Write the committed transcript to a file, defaulting to a timestamped
/// name in the current directory. Returns the path written.
pub fn save_transcript(
    records: &[ConversationRecord],
    path: Option<PathBuf>,
) -> std::io::Result<PathBuf> {
    let path = path.unwrap_or_else(|| {
        PathBuf::from(
            chrono::Local::now()
                .format("docq-transcript-%Y%m%d-%H%M%S.txt")
                .to_string(),
        )
    });

    let mut out = String::new();
    for record in records {
        out.push_str(&format!("You: {}\n\n", record.question));
        out.push_str(&format!("DocQ: {}\n", record.answer));
        if let Some(ms) = record.response_time_ms {
            out.push_str(&format!("({} ms)\n", ms));
        }
        out.push_str("\n---\n\n");
    }
    std::fs::write(&path, out)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo wörld", 5), "héllo...");
        assert_eq!(truncate_chars("short", 10), "short");
    }

    #[test]
    fn test_format_size_units() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn test_save_transcript_writes_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transcript.txt");
        let records = vec![ConversationRecord {
            id: 1,
            question: "What is X?".into(),
            answer: "X is a thing.".into(),
            created_at: 0,
            response_time_ms: Some(1200),
        }];

        let written = save_transcript(&records, Some(path.clone())).unwrap();
        assert_eq!(written, path);
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("You: What is X?"));
        assert!(content.contains("DocQ: X is a thing."));
        assert!(content.contains("(1200 ms)"));
    }
}

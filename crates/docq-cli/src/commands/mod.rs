//! Slash commands for interactive mode

mod feedback;
mod graphrag;
mod scope;

pub use feedback::FeedbackCommand;
pub use graphrag::{GraphragCommand, GraphragOp};
pub use scope::ScopeCommand;

use std::path::PathBuf;

use docq_api::FeedbackRequest;

/// Result of executing a slash command
pub enum CommandResult {
    /// Show a message to the user (not sent to the service)
    Message(String),
    /// Clear the conversation
    Clear,
    /// Exit the application
    Exit,
    /// Restrict answers to these knowledge entries (empty = everything)
    SetScope(Vec<i64>),
    /// Open the knowledge selector (TUI only)
    OpenScopeSelector,
    /// Fetch and show stored question/answer history
    ShowHistory(Option<u32>),
    /// Fetch and show knowledge base statistics
    ShowStats,
    /// Fetch and show preset questions, optionally for one category
    ShowPresets(Option<String>),
    /// Ask the nth preset question from the last listing (1-based)
    AskPreset(usize),
    /// Rate a stored answer
    SendFeedback(FeedbackRequest),
    /// Run a graph index operation
    Graphrag(GraphragOp),
    /// Write the transcript to a file
    SaveTranscript(Option<PathBuf>),
    /// Unknown command
    Unknown(String),
}

/// Parse and execute a slash command
pub fn execute_command(input: &str) -> Option<CommandResult> {
    let input = input.trim();

    if !input.starts_with('/') {
        return None;
    }

    let parts: Vec<&str> = input[1..].splitn(2, ' ').collect();
    let command = parts[0].to_lowercase();
    let args = parts.get(1).map(|s| s.trim()).unwrap_or("");

    Some(match command.as_str() {
        "help" | "h" | "?" => CommandResult::Message(help_message()),

        "clear" | "c" => CommandResult::Clear,

        "quit" | "exit" | "q" => CommandResult::Exit,

        "select" | "scope" | "k" => ScopeCommand::execute(args),

        "history" | "hist" => match args {
            "" => CommandResult::ShowHistory(None),
            n => match n.parse::<u32>() {
                Ok(limit) => CommandResult::ShowHistory(Some(limit)),
                Err(_) => {
                    CommandResult::Message(format!("Invalid limit '{n}'. Use /history or /history 25."))
                }
            },
        },

        "stats" => CommandResult::ShowStats,

        "presets" => CommandResult::ShowPresets((!args.is_empty()).then(|| args.to_string())),

        "preset" | "p" => match args.parse::<usize>() {
            Ok(n) if n >= 1 => CommandResult::AskPreset(n),
            _ => CommandResult::Message(
                "Usage: /preset <number> (list them first with /presets)".to_string(),
            ),
        },

        "feedback" | "fb" => FeedbackCommand::execute(args),

        "graphrag" | "graph" | "g" => GraphragCommand::execute(args),

        "save" => {
            CommandResult::SaveTranscript((!args.is_empty()).then(|| PathBuf::from(args)))
        }

        _ => CommandResult::Unknown(command),
    })
}

fn help_message() -> String {
    r#"Available commands:
  /help, /h, /?          Show this help message
  /select, /k [ids]      Pick knowledge entries to answer from (3,7) or open selector
  /select all            Answer from the whole knowledge base again
  /history [n]           Show stored question/answer history
  /presets [category]    List preset questions
  /preset <n>            Ask preset question n from the last listing
  /stats                 Show knowledge base statistics
  /feedback <id> up|down [comment]
                         Rate a stored answer from /history
  /graphrag <op>         Graph index: status, build, rebuild, delete
  /save [path]           Write the transcript to a file
  /clear, /c             Clear the conversation
  /quit, /exit, /q       Exit docq

Examples:
  /select                Open the knowledge selector
  /select 3,7            Answer only from entries 3 and 7
  /history 25            Show the last 25 stored answers
  /feedback 41 down answer cited the wrong report
  /graphrag rebuild      Rebuild the graph index from scratch"#
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- dispatch ---

    #[test]
    fn test_plain_text_is_not_a_command() {
        assert!(execute_command("what is the refund policy?").is_none());
        assert!(execute_command("").is_none());
    }

    #[test]
    fn test_unknown_command_reports_name() {
        match execute_command("/bogus").unwrap() {
            CommandResult::Unknown(name) => assert_eq!(name, "bogus"),
            _ => panic!("expected Unknown"),
        }
    }

    #[test]
    fn test_aliases_reach_same_command() {
        assert!(matches!(execute_command("/q").unwrap(), CommandResult::Exit));
        assert!(matches!(execute_command("/exit").unwrap(), CommandResult::Exit));
        assert!(matches!(execute_command("/c").unwrap(), CommandResult::Clear));
    }

    // --- scope ---

    #[test]
    fn test_select_with_ids_sets_scope() {
        match execute_command("/select 3,7").unwrap() {
            CommandResult::SetScope(ids) => assert_eq!(ids, vec![3, 7]),
            _ => panic!("expected SetScope"),
        }
    }

    #[test]
    fn test_select_without_ids_opens_selector() {
        assert!(matches!(
            execute_command("/select").unwrap(),
            CommandResult::OpenScopeSelector
        ));
    }

    #[test]
    fn test_select_all_clears_scope() {
        match execute_command("/select all").unwrap() {
            CommandResult::SetScope(ids) => assert!(ids.is_empty()),
            _ => panic!("expected SetScope"),
        }
    }

    #[test]
    fn test_select_rejects_bad_id() {
        assert!(matches!(
            execute_command("/select 3,x").unwrap(),
            CommandResult::Message(_)
        ));
    }

    // --- history and presets ---

    #[test]
    fn test_history_limit_parsed() {
        match execute_command("/history 25").unwrap() {
            CommandResult::ShowHistory(limit) => assert_eq!(limit, Some(25)),
            _ => panic!("expected ShowHistory"),
        }
        assert!(matches!(
            execute_command("/history").unwrap(),
            CommandResult::ShowHistory(None)
        ));
    }

    #[test]
    fn test_preset_requires_positive_index() {
        assert!(matches!(
            execute_command("/preset 2").unwrap(),
            CommandResult::AskPreset(2)
        ));
        assert!(matches!(
            execute_command("/preset 0").unwrap(),
            CommandResult::Message(_)
        ));
    }

    // --- feedback ---

    #[test]
    fn test_feedback_parses_verdict_and_comment() {
        match execute_command("/feedback 41 down answer cited the wrong report").unwrap() {
            CommandResult::SendFeedback(req) => {
                assert_eq!(req.qa_id, 41);
                assert!(!req.is_helpful);
                assert_eq!(req.feedback.as_deref(), Some("answer cited the wrong report"));
            }
            _ => panic!("expected SendFeedback"),
        }
    }

    #[test]
    fn test_feedback_up_without_comment() {
        match execute_command("/fb 7 up").unwrap() {
            CommandResult::SendFeedback(req) => {
                assert_eq!(req.qa_id, 7);
                assert!(req.is_helpful);
                assert!(req.feedback.is_none());
            }
            _ => panic!("expected SendFeedback"),
        }
    }

    // --- graphrag ---

    #[test]
    fn test_graphrag_ops_parsed() {
        assert!(matches!(
            execute_command("/graphrag status").unwrap(),
            CommandResult::Graphrag(GraphragOp::Status)
        ));
        assert!(matches!(
            execute_command("/graphrag rebuild").unwrap(),
            CommandResult::Graphrag(GraphragOp::Build { rebuild: true })
        ));
        assert!(matches!(
            execute_command("/g delete").unwrap(),
            CommandResult::Graphrag(GraphragOp::Delete)
        ));
    }

    #[test]
    fn test_graphrag_without_op_shows_usage() {
        assert!(matches!(
            execute_command("/graphrag").unwrap(),
            CommandResult::Message(_)
        ));
    }

    // --- save ---

    #[test]
    fn test_save_with_and_without_path() {
        match execute_command("/save notes.txt").unwrap() {
            CommandResult::SaveTranscript(path) => {
                assert_eq!(path, Some(PathBuf::from("notes.txt")));
            }
            _ => panic!("expected SaveTranscript"),
        }
        assert!(matches!(
            execute_command("/save").unwrap(),
            CommandResult::SaveTranscript(None)
        ));
    }
}

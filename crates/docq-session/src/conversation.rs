//! Conversation state: question/answer records and in-flight streaming scratch.

use docq_api::stream::AnswerBuilder;
use serde::{Deserialize, Serialize};

/// One question and its answer in the transcript
///
/// Records are created speculatively with an empty `answer` the instant a
/// question is submitted, so the transcript can show the question before the
/// network resolves. The answer and response time are written exactly once,
/// at commit. A record whose stream fails is removed, never left half-filled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationRecord {
    pub id: u64,
    pub question: String,
    pub answer: String,
    /// Submission time, unix millis
    pub created_at: i64,
    /// Wall-clock time from submission to commit
    pub response_time_ms: Option<u64>,
}

impl ConversationRecord {
    /// Whether the answer has been committed yet
    pub fn is_committed(&self) -> bool {
        self.response_time_ms.is_some()
    }
}

/// Scratch state for the single in-flight stream
///
/// Owned and mutated only by the session's ask loop; the rendering layer
/// reads it to show the partial answer for the active record in place of the
/// record's still-empty persisted `answer`.
#[derive(Debug, Default)]
pub struct StreamingState {
    pub active_record_id: Option<u64>,
    pub is_streaming: bool,
    partial: AnswerBuilder,
}

impl StreamingState {
    /// The partial answer accumulated so far
    pub fn partial_answer(&self) -> &str {
        self.partial.as_str()
    }

    pub(crate) fn begin(&mut self, record_id: u64) {
        self.active_record_id = Some(record_id);
        self.is_streaming = true;
        self.partial = AnswerBuilder::new();
    }

    pub(crate) fn append(&mut self, event: &docq_api::AnswerEvent) {
        self.partial.push_event(event);
    }

    /// Clear and hand back the accumulated text
    pub(crate) fn take(&mut self) -> String {
        self.active_record_id = None;
        self.is_streaming = false;
        std::mem::take(&mut self.partial).into_text()
    }
}

/// Ordered transcript of question/answer records
///
/// The session's ask loop is the only writer; everything else reads.
#[derive(Debug, Default)]
pub struct Conversation {
    records: Vec<ConversationRecord>,
    /// In-flight stream scratch
    pub streaming: StreamingState,
    /// Last failure surfaced to the user
    pub error: Option<String>,
    next_id: u64,
}

impl Conversation {
    /// All records, oldest first
    pub fn records(&self) -> &[ConversationRecord] {
        &self.records
    }

    pub fn get(&self, id: u64) -> Option<&ConversationRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Wipe the transcript
    pub fn clear(&mut self) {
        self.records.clear();
        self.error = None;
    }

    /// Insert a speculative record for a just-submitted question, minting its id
    pub(crate) fn insert_speculative(&mut self, question: &str) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.records.push(ConversationRecord {
            id,
            question: question.to_string(),
            answer: String::new(),
            created_at: chrono::Utc::now().timestamp_millis(),
            response_time_ms: None,
        });
        id
    }

    /// Finalize a record with its committed answer, returning a copy
    pub(crate) fn commit(
        &mut self,
        id: u64,
        answer: String,
        response_time_ms: u64,
    ) -> Option<ConversationRecord> {
        let record = self.records.iter_mut().find(|r| r.id == id)?;
        record.answer = answer;
        record.response_time_ms = Some(response_time_ms);
        Some(record.clone())
    }

    /// Remove a speculative record whose stream failed
    pub(crate) fn discard(&mut self, id: u64) -> bool {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        self.records.len() != before
    }
}

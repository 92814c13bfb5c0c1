//! Session event types

use serde::{Deserialize, Serialize};

use crate::conversation::ConversationRecord;

/// Events emitted while a question is being answered
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A question was accepted and its speculative record inserted
    AskStart { record_id: u64, question: String },

    /// An answer fragment arrived
    AnswerDelta { record_id: u64, delta: String },

    /// The answer was committed into the transcript
    AskCommitted { record: ConversationRecord },

    /// The stream failed and the speculative record was removed
    AskAborted { record_id: u64, reason: String },
}

impl SessionEvent {
    /// Whether this event ends the ask that produced it.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionEvent::AskCommitted { .. } | SessionEvent::AskAborted { .. }
        )
    }
}

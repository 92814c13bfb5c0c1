//! Session state management and the streaming ask loop

use std::sync::Arc;
use std::time::Instant;

use futures::StreamExt;
use tokio_util::sync::CancellationToken;

use docq_api::AnswerEvent;
use tokio::sync::broadcast;

use crate::{
    conversation::{Conversation, ConversationRecord},
    error::{Error, Result},
    events::SessionEvent,
    handle::SessionHandle,
    transport::AskTransport,
};

/// Where the current (or last) ask stands
///
/// `Idle` is the precondition for accepting a question; a new submission
/// while a stream is open is rejected outright rather than queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AskPhase {
    /// No question has been submitted yet, or the last one finished
    #[default]
    Idle,
    /// Question accepted, speculative record inserted, stream being opened
    Submitted,
    /// Events are arriving
    Streaming,
    /// The answer was committed into the transcript
    Committed,
    /// The stream failed and the speculative record was removed
    Aborted,
}

impl AskPhase {
    /// Whether a new question can be accepted in this phase
    pub fn accepts_questions(&self) -> bool {
        !matches!(self, AskPhase::Submitted | AskPhase::Streaming)
    }
}

/// The session that reconciles streamed answers into a transcript
///
/// Exactly one stream is in flight at a time. While it runs, the speculative
/// record sits in the store with an empty answer and the partial text lives
/// in [`crate::conversation::StreamingState`]; the terminal event decides
/// whether the record is committed or removed.
pub struct Session {
    conversation: Conversation,
    scope: Vec<i64>,
    transport: Arc<dyn AskTransport>,
    event_tx: broadcast::Sender<SessionEvent>,
    handle: SessionHandle,
    phase: AskPhase,
}

impl Session {
    /// Create a new session
    pub fn new(transport: Arc<dyn AskTransport>) -> Self {
        let (event_tx, _) = broadcast::channel(256);
        Self {
            conversation: Conversation::default(),
            scope: Vec::new(),
            transport,
            event_tx,
            handle: SessionHandle::new(),
            phase: AskPhase::Idle,
        }
    }

    /// Subscribe to session events
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.event_tx.subscribe()
    }

    /// The transcript and streaming scratch state
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// All committed and pending records, oldest first
    pub fn records(&self) -> &[ConversationRecord] {
        self.conversation.records()
    }

    /// The current ask phase
    pub fn phase(&self) -> AskPhase {
        self.phase
    }

    /// Knowledge entry ids constraining answers; empty means search everything
    pub fn scope(&self) -> &[i64] {
        &self.scope
    }

    /// Restrict answers to the given knowledge entries
    pub fn set_scope(&mut self, knowledge_ids: Vec<i64>) {
        self.scope = knowledge_ids;
    }

    /// Wipe the transcript
    pub fn clear(&mut self) {
        self.conversation.clear();
    }

    /// Get a cloneable handle for aborting from external code
    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    /// Abort the in-flight stream, if any
    pub fn abort(&self) {
        self.handle.abort();
    }

    /// Whether a question is currently streaming
    pub fn is_running(&self) -> bool {
        self.handle.is_running()
    }

    /// Submit a question and reconcile its streamed answer
    ///
    /// Returns the id of the committed record. On any failure the speculative
    /// record has already been removed and the reason stored in
    /// `conversation().error`, so the transcript never holds a half answer.
    pub async fn ask(&mut self, question: impl Into<String>) -> Result<u64> {
        let question = question.into();
        if self.handle.is_running() {
            return Err(Error::Busy);
        }

        let cancel = self.handle.arm();

        self.phase = AskPhase::Submitted;
        self.conversation.error = None;
        let record_id = self.conversation.insert_speculative(&question);
        self.conversation.streaming.begin(record_id);
        let _ = self.event_tx.send(SessionEvent::AskStart {
            record_id,
            question: question.clone(),
        });

        let result = self.run_ask(record_id, &question, cancel).await;
        self.handle.settle();

        result.map(|_| record_id)
    }

    /// Open the stream and drive it to a terminal state.
    async fn run_ask(
        &mut self,
        record_id: u64,
        question: &str,
        cancel: CancellationToken,
    ) -> Result<()> {
        let started = Instant::now();

        let mut events = match self.transport.ask(question, &self.scope).await {
            Ok(stream) => stream,
            Err(err) => {
                tracing::warn!("ask request failed: {err}");
                let reason = err.to_string();
                return Err(self.abort_ask(record_id, reason, Error::Api(err)));
            }
        };
        self.phase = AskPhase::Streaming;

        loop {
            let event = tokio::select! {
                _ = cancel.cancelled() => {
                    return Err(self.abort_ask(record_id, "cancelled".to_string(), Error::Cancelled));
                }
                event = events.next() => event,
            };

            let Some(event) = event else {
                // Connection closed without a terminal event; the partial
                // answer is untrustworthy and is thrown away.
                return Err(self.abort_ask(
                    record_id,
                    "answer stream ended before completion".to_string(),
                    Error::Incomplete,
                ));
            };

            match event {
                AnswerEvent::Content { ref data } => {
                    self.conversation.streaming.append(&event);
                    let _ = self.event_tx.send(SessionEvent::AnswerDelta {
                        record_id,
                        delta: data.clone(),
                    });
                }
                AnswerEvent::Done => {
                    let answer = self.conversation.streaming.take();
                    let elapsed_ms = started.elapsed().as_millis() as u64;
                    self.phase = AskPhase::Committed;
                    if let Some(record) = self.conversation.commit(record_id, answer, elapsed_ms) {
                        let _ = self.event_tx.send(SessionEvent::AskCommitted { record });
                    }
                    // Terminal: anything the server sends after this is ignored.
                    return Ok(());
                }
                AnswerEvent::Error { data } => {
                    tracing::warn!("server aborted answer stream: {data}");
                    return Err(self.abort_ask(record_id, data.clone(), Error::Stream(data)));
                }
            }
        }
    }

    /// Remove the speculative record and surface the failure.
    fn abort_ask(&mut self, record_id: u64, reason: String, err: Error) -> Error {
        self.conversation.streaming.take();
        self.conversation.discard(record_id);
        self.conversation.error = Some(reason.clone());
        self.phase = AskPhase::Aborted;
        let _ = self.event_tx.send(SessionEvent::AskAborted { record_id, reason });
        err
    }
}

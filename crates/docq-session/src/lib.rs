//! docq-session: Streaming answer reconciler and conversation state
//!
//! This crate drives one answer stream at a time: it inserts a speculative
//! record when a question is submitted, accumulates content fragments while
//! the stream runs, and either commits the answer into the transcript or
//! rolls the record back when the stream fails.

pub mod conversation;
pub mod error;
pub mod events;
pub mod handle;
pub mod progress;
pub mod session;
pub mod transport;

pub use conversation::{Conversation, ConversationRecord, StreamingState};
pub use error::{Error, Result};
pub use events::SessionEvent;
pub use handle::SessionHandle;
pub use progress::{BuildProgress, BuildProgressStream, WatchConfig, watch_build};
pub use session::{AskPhase, Session};
pub use transport::{AskTransport, HttpTransport};

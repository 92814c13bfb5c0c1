//! docq-api: Typed HTTP client for the document intelligence service
//!
//! This crate wraps the service's REST surface: authentication, document
//! upload and analysis, knowledge base search and question answering
//! (including the streamed variant), and GraphRAG index management.

mod auth;
pub mod client;
pub mod documents;
pub mod error;
mod graphrag;
mod knowledge;
pub mod stream;
pub mod types;

pub use client::{Client, DEFAULT_BASE_URL};
pub use documents::{ALLOWED_EXTENSIONS, MAX_BATCH_FILES, MAX_UPLOAD_BYTES};
pub use error::{Error, Result};
pub use stream::{AnswerEvent, AnswerEventStream};
pub use types::*;

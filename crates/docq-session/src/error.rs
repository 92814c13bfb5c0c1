//! Error types for docq-session

use thiserror::Error;

/// Result type alias using docq-session Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reconciling a streamed answer
#[derive(Error, Debug)]
pub enum Error {
    /// An error from the API client layer
    #[error(transparent)]
    Api(#[from] docq_api::Error),

    /// A question was submitted while another stream is still open
    #[error("a question is already streaming; wait for it to finish")]
    Busy,

    /// The in-flight stream was cancelled by the user
    #[error("cancelled")]
    Cancelled,

    /// The server reported a failure through the event stream
    #[error("answer stream failed: {0}")]
    Stream(String),

    /// The stream ended without a terminal event
    #[error("answer stream ended before completion")]
    Incomplete,
}

impl Error {
    /// Check if this error means the stored token is no longer usable
    pub fn is_auth(&self) -> bool {
        matches!(self, Error::Api(e) if e.is_auth())
    }
}

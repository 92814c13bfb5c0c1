//! Error types for docq-api

use thiserror::Error;

/// Result type alias using docq-api Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when talking to the document intelligence service
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Local file I/O failed (upload source, download target)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Server rejected the request with an error body
    #[error("API error: {detail} (status {status})")]
    Api { status: u16, detail: String },

    /// No bearer token is available in either credential scope
    #[error("Not authenticated: no stored token")]
    MissingToken,

    /// The response stream failed mid-flight
    #[error("Stream error: {0}")]
    Stream(String),

    /// The response stream ended without a terminal event
    #[error("Stream ended before completion")]
    Incomplete,

    /// Request was cancelled before completion
    #[error("Request aborted")]
    Aborted,

    /// Request rejected client-side before sending
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Unexpected response format
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl Error {
    /// Create an API error from status code and detail message
    pub fn api(status: u16, detail: impl Into<String>) -> Self {
        Self::Api {
            status,
            detail: detail.into(),
        }
    }

    /// Check if this error means the user needs to (re)authenticate
    pub fn is_auth(&self) -> bool {
        match self {
            Error::MissingToken => true,
            Error::Api { status, detail } => {
                if matches!(status, 401 | 403) {
                    return true;
                }
                let msg = detail.to_lowercase();
                msg.contains("token expired")
                    || msg.contains("invalid token")
                    || msg.contains("not authenticated")
                    || msg.contains("could not validate credentials")
            }
            _ => false,
        }
    }

    /// Check if this error is a missing-resource response
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Api { status: 404, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- is_auth classification ---

    #[test]
    fn test_auth_missing_token() {
        assert!(Error::MissingToken.is_auth());
    }

    #[test]
    fn test_auth_unauthorized_status() {
        assert!(Error::api(401, "Could not validate credentials").is_auth());
        assert!(Error::api(403, "Insufficient permissions").is_auth());
    }

    #[test]
    fn test_auth_expired_token_detail() {
        let e = Error::api(400, "Token expired, please log in again");
        assert!(e.is_auth());
    }

    #[test]
    fn test_not_auth_server_error() {
        assert!(!Error::api(500, "Internal server error").is_auth());
        assert!(!Error::api(422, "question must not be empty").is_auth());
    }

    #[test]
    fn test_not_auth_non_api() {
        assert!(!Error::Incomplete.is_auth());
        assert!(!Error::Aborted.is_auth());
        assert!(!Error::Stream("connection reset".into()).is_auth());
    }

    // --- is_not_found classification ---

    #[test]
    fn test_not_found_status() {
        assert!(Error::api(404, "Knowledge item not found").is_not_found());
    }

    #[test]
    fn test_not_found_other_statuses() {
        assert!(!Error::api(400, "bad request").is_not_found());
        assert!(!Error::MissingToken.is_not_found());
    }

    // --- display formatting ---

    #[test]
    fn test_api_error_display() {
        let e = Error::api(404, "Knowledge item not found");
        assert_eq!(
            e.to_string(),
            "API error: Knowledge item not found (status 404)"
        );
    }

    #[test]
    fn test_invalid_request_display() {
        let e = Error::InvalidRequest("file exceeds 16 MiB".into());
        assert_eq!(e.to_string(), "Invalid request: file exceeds 16 MiB");
    }
}

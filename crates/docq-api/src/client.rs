//! Request context for the document intelligence service
//!
//! [`Client`] carries everything a request needs: the reqwest connection
//! pool, the service base URL, and the current bearer token. It is passed
//! explicitly wherever requests are made; nothing reads ambient state.

use reqwest::Method;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};

/// Default service address, matching the backend's development port
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Authenticated request context for the remote service
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl Client {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
            token: None,
        }
    }

    /// Attach a bearer token to all subsequent requests
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Build a request with the bearer token attached when one is set
    pub(crate) fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self.http.request(method, self.url(path));
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    pub(crate) fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.request(Method::GET, path)
    }

    pub(crate) fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.request(Method::POST, path)
    }

    pub(crate) fn delete(&self, path: &str) -> reqwest::RequestBuilder {
        self.request(Method::DELETE, path)
    }

    /// Fail fast on endpoints that require authentication
    pub(crate) fn require_token(&self) -> Result<()> {
        if self.token.is_some() {
            Ok(())
        } else {
            Err(Error::MissingToken)
        }
    }

    /// Send a request and deserialize the 2xx JSON body
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<T> {
        let response = builder.send().await?;
        Self::json_or_error(response).await
    }

    /// Deserialize a successful response, mapping non-2xx to [`Error::Api`]
    pub(crate) async fn json_or_error<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T> {
        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            Err(Self::error_from_response(response).await)
        }
    }

    /// Extract `{ "detail": … }` from an error response body
    ///
    /// The backend wraps every failure this way; anything else (proxies,
    /// crashes) falls back to the raw body or the bare status code.
    pub(crate) async fn error_from_response(response: reqwest::Response) -> Error {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let detail = match serde_json::from_str::<ErrorBody>(&body) {
            Ok(parsed) => parsed.detail,
            Err(_) if body.trim().is_empty() => format!("HTTP {status}"),
            Err(_) => body,
        };
        Error::api(status, detail)
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MessageResponse;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = Client::new("http://localhost:8000/");
        assert_eq!(client.url("/api/auth/me"), "http://localhost:8000/api/auth/me");
    }

    #[test]
    fn test_require_token() {
        let client = Client::new(DEFAULT_BASE_URL);
        assert!(matches!(client.require_token(), Err(Error::MissingToken)));
        let client = client.with_token("tok");
        assert!(client.require_token().is_ok());
    }

    #[tokio::test]
    async fn test_bearer_token_attached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/ping"))
            .and(header("authorization", "Bearer secret-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message": "pong"
            })))
            .mount(&server)
            .await;

        let client = Client::new(server.uri()).with_token("secret-token");
        let response: MessageResponse = client.send_json(client.get("/api/ping")).await.unwrap();
        assert_eq!(response.message, "pong");
    }

    #[tokio::test]
    async fn test_error_body_detail_extracted() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "detail": "Knowledge item not found"
            })))
            .mount(&server)
            .await;

        let client = Client::new(server.uri());
        let err = client
            .send_json::<MessageResponse>(client.get("/api/missing"))
            .await
            .unwrap_err();
        match err {
            Error::Api { status, detail } => {
                assert_eq!(status, 404);
                assert_eq!(detail, "Knowledge item not found");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_error_body_without_detail_falls_back() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/broken"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let client = Client::new(server.uri());
        let err = client
            .send_json::<MessageResponse>(client.get("/api/broken"))
            .await
            .unwrap_err();
        match err {
            Error::Api { status, detail } => {
                assert_eq!(status, 502);
                assert_eq!(detail, "bad gateway");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }
}

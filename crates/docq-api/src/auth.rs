//! Authentication endpoints
//!
//! Token issuance and refresh are entirely server-side; this module only
//! submits credentials and hands back what the server mints. Where the token
//! ends up (persistent or session scope) is the caller's decision.

use crate::client::Client;
use crate::error::Result;
use crate::types::{
    LoginRequest, LoginResponse, LogoutRequest, MessageResponse, RegisterRequest, RegisterResponse,
    TokenRefreshRequest, TokenRefreshResponse, UserProfile, VerifyResponse,
};

impl Client {
    /// Log in with username (or email) and password
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse> {
        self.send_json(self.post("/api/auth/login").json(request))
            .await
    }

    /// Obtain a short-lived guest identity without an account
    pub async fn guest_login(&self) -> Result<LoginResponse> {
        self.send_json(self.post("/api/auth/guest-login")).await
    }

    /// Create a new account
    pub async fn register(&self, request: &RegisterRequest) -> Result<RegisterResponse> {
        self.send_json(self.post("/api/auth/register").json(request))
            .await
    }

    /// Exchange a refresh token for a fresh access token
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokenRefreshResponse> {
        let request = TokenRefreshRequest {
            refresh_token: refresh_token.to_string(),
        };
        self.send_json(self.post("/api/auth/refresh").json(&request))
            .await
    }

    /// Invalidate the server-side session
    ///
    /// Best effort: local credential removal should proceed even when this
    /// call fails, so callers typically log rather than propagate an error.
    pub async fn logout(&self, refresh_token: Option<String>) -> Result<MessageResponse> {
        let request = LogoutRequest { refresh_token };
        self.send_json(self.post("/api/auth/logout").json(&request))
            .await
    }

    /// Profile of the authenticated user
    pub async fn me(&self) -> Result<UserProfile> {
        self.require_token()?;
        self.send_json(self.get("/api/auth/me")).await
    }

    /// Check whether the attached token is still accepted
    ///
    /// The endpoint answers 200 for both outcomes; `valid: false` plus an
    /// `error` string means the token is dead and the user must log in again.
    pub async fn verify(&self) -> Result<VerifyResponse> {
        self.require_token()?;
        self.send_json(self.get("/api/auth/verify")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn profile_json() -> serde_json::Value {
        serde_json::json!({
            "id": 7,
            "username": "ada",
            "email": "ada@example.com",
            "full_name": "Ada L.",
            "phone": null,
            "department": "Research",
            "position": null,
            "avatar_url": null,
            "role": { "name": "user", "display_name": "User" },
            "last_login": "2025-06-01T08:00:00",
            "created_at": "2024-11-20T10:30:00",
            "is_guest": false
        })
    }

    #[tokio::test]
    async fn test_login_round_trip() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .and(body_json(serde_json::json!({
                "username": "ada",
                "password": "pw123456",
                "remember_me": true
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "acc",
                "refresh_token": "ref",
                "token_type": "bearer",
                "expires_in": 1800,
                "user": profile_json()
            })))
            .mount(&server)
            .await;

        let client = Client::new(server.uri());
        let request = LoginRequest::new("ada", "pw123456").remembered();
        let response = client.login(&request).await.unwrap();
        assert_eq!(response.access_token, "acc");
        assert_eq!(response.user.display_name(), "Ada L.");
        assert!(!response.user.is_guest);
    }

    #[tokio::test]
    async fn test_verify_reports_dead_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/auth/verify"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "valid": false,
                "error": "令牌无效"
            })))
            .mount(&server)
            .await;

        let client = Client::new(server.uri()).with_token("stale");
        let response = client.verify().await.unwrap();
        assert!(!response.valid);
        assert!(response.error.is_some());
    }

    #[tokio::test]
    async fn test_guest_login_session_identity() {
        let server = MockServer::start().await;
        let mut guest = profile_json();
        guest["is_guest"] = serde_json::json!(true);
        guest["username"] = serde_json::json!("guest_1234");
        Mock::given(method("POST"))
            .and(path("/api/auth/guest-login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "gacc",
                "refresh_token": "gref",
                "token_type": "bearer",
                "expires_in": 3600,
                "user": guest
            })))
            .mount(&server)
            .await;

        let client = Client::new(server.uri());
        let response = client.guest_login().await.unwrap();
        assert!(response.user.is_guest);
    }
}

//! Godparent platform REST client.
//!
//! Thin HTTP wrapper over the auth and user endpoints the whiteboard and the
//! admin tools need. Status handling and body parsing live in pure functions
//! so they can be tested without a server.

use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by platform API calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Credentials or token were rejected (HTTP 401).
    #[error("invalid credentials or expired session")]
    Unauthorized,

    /// The resource does not exist (HTTP 404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Any other non-success status.
    #[error("API response error: status {status}")]
    Status { status: u16, body: String },

    /// The request could not be sent or the body could not be read.
    #[error("API request failed: {0}")]
    Request(String),

    /// The response body was not the expected JSON.
    #[error("API response parse failed: {0}")]
    Parse(String),

    /// The HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

/// Fields of a platform user the client reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub course: Option<String>,
    #[serde(default)]
    pub year_of_entry: Option<u32>,
    #[serde(default)]
    pub approval_status: Option<ApprovalStatus>,
    #[serde(default)]
    pub whiteboard: Option<String>,
}

/// Partial user update. Absent fields are left unchanged by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whiteboard: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub status: Option<bool>,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct UserEnvelope {
    user: UserProfile,
}

// =============================================================================
// CLIENT
// =============================================================================

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Build a client from config, carrying the configured token if any.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::HttpClientBuild`] if the HTTP client cannot be created.
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: config.api_url.clone(), token: config.token.clone() })
    }

    /// A copy of this client that authenticates with `token`.
    #[must_use]
    pub fn authorized(&self, token: &str) -> Self {
        Self { token: Some(token.to_owned()), ..self.clone() }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // --- Auth ---

    /// `POST /auth/login`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] for bad credentials, or a transport/parse error.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let body = serde_json::to_value(LoginRequest { email, password }).map_err(|e| ApiError::Parse(e.to_string()))?;
        let text = self.send(Method::POST, "/auth/login", Some(body)).await?;
        parse_json(&text)
    }

    /// `GET /auth/verify`: succeeds while the token is valid.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] for an expired or missing token.
    pub async fn verify(&self) -> Result<(), ApiError> {
        self.send(Method::GET, "/auth/verify", None).await.map(drop)
    }

    /// `POST /auth/logout`. A 401 means the session is already gone and counts as success.
    ///
    /// # Errors
    ///
    /// Returns any other API error.
    pub async fn logout(&self) -> Result<(), ApiError> {
        match self.send(Method::POST, "/auth/logout", None).await {
            Ok(_) | Err(ApiError::Unauthorized) => Ok(()),
            Err(e) => Err(e),
        }
    }

    // --- Users ---

    /// `GET /users/{id}`.
    ///
    /// # Errors
    ///
    /// Returns an API error if the request fails or the user does not exist.
    pub async fn get_user(&self, user_id: &str) -> Result<UserProfile, ApiError> {
        let text = self.send(Method::GET, &format!("/users/{user_id}"), None).await?;
        parse_user(&text)
    }

    /// `PUT /users/{id}` with a partial body.
    ///
    /// # Errors
    ///
    /// Returns an API error if the server does not accept the update.
    pub async fn update_user(&self, user_id: &str, update: &UserUpdate) -> Result<(), ApiError> {
        let body = serde_json::to_value(update).map_err(|e| ApiError::Parse(e.to_string()))?;
        self.send(Method::PUT, &format!("/users/{user_id}"), Some(body)).await.map(drop)
    }

    /// `GET /users/getPendingApproval`.
    ///
    /// # Errors
    ///
    /// Returns an API error if the request fails or the list cannot be parsed.
    pub async fn pending_approvals(&self) -> Result<Vec<UserProfile>, ApiError> {
        let text = self.send(Method::GET, "/users/getPendingApproval", None).await?;
        parse_json(&text)
    }

    /// `PUT /users/{id}/approve`.
    ///
    /// # Errors
    ///
    /// Returns an API error if the server rejects the request.
    pub async fn approve(&self, user_id: &str) -> Result<(), ApiError> {
        self.send(Method::PUT, &format!("/users/{user_id}/approve"), None).await.map(drop)
    }

    /// `PUT /users/{id}/unapprove`.
    ///
    /// # Errors
    ///
    /// Returns an API error if the server rejects the request.
    pub async fn unapprove(&self, user_id: &str) -> Result<(), ApiError> {
        self.send(Method::PUT, &format!("/users/{user_id}/unapprove"), None).await.map(drop)
    }

    async fn send(&self, method: Method, path: &str, body: Option<serde_json::Value>) -> Result<String, ApiError> {
        let url = format!("{}{path}", self.base_url);
        debug!(%method, %url, "api request");

        let mut request = self.http.request(method, &url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await.map_err(|e| ApiError::Request(e.to_string()))?;
        let status = response.status();
        let text = response.text().await.map_err(|e| ApiError::Request(e.to_string()))?;
        check_status(status, path, text)
    }
}

// =============================================================================
// PARSING
// =============================================================================

fn check_status(status: StatusCode, path: &str, body: String) -> Result<String, ApiError> {
    match status {
        s if s.is_success() => Ok(body),
        StatusCode::UNAUTHORIZED => Err(ApiError::Unauthorized),
        StatusCode::NOT_FOUND => Err(ApiError::NotFound(path.to_owned())),
        s => Err(ApiError::Status { status: s.as_u16(), body }),
    }
}

fn parse_json<T: serde::de::DeserializeOwned>(text: &str) -> Result<T, ApiError> {
    serde_json::from_str(text).map_err(|e| ApiError::Parse(e.to_string()))
}

/// `GET /users/{id}` wraps the user in `{ "user": ... }`.
fn parse_user(text: &str) -> Result<UserProfile, ApiError> {
    parse_json::<UserEnvelope>(text).map(|envelope| envelope.user)
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;

//! Identity backend contract and its HTTP client.
//!
//! The backend is the external collaborator that verifies credentials and
//! resolves tokens to profiles. This crate never retries silently and never
//! interprets the token beyond forwarding it as a bearer credential.

use crate::error::GateError;
use crate::routes::Role;
use crate::session::SessionToken;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use url::Url;
use uuid::Uuid;

/// Profile fields returned by the backend.
///
/// Deliberately role-free: the role travels as a separate signed claim, and
/// any role-like field the body happens to carry lands in `extra` where
/// nothing reads it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePayload {
    /// Stable account identifier
    pub id: Uuid,
    /// Login email
    pub email: String,
    /// Name shown in the UI
    pub display_name: String,
    /// Remaining profile references, passed through untouched
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// Everything a successful login yields.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    /// Freshly issued session token
    pub token: SessionToken,
    /// Role claim issued with it
    pub role: Role,
    /// Initial profile view
    pub profile: ProfilePayload,
}

/// Contract with the identity-resolution service.
#[async_trait]
pub trait IdentityBackend: Send + Sync {
    /// Verify credentials and issue a session.
    ///
    /// # Errors
    ///
    /// `InvalidCredentials` on rejection, `ServiceUnavailable` when the
    /// backend cannot be reached or is failing.
    async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, GateError>;

    /// Resolve a stored token to its profile.
    ///
    /// Returns `Ok(None)` when the backend no longer recognizes the token
    /// (revoked or expired); transient failures are errors so the caller
    /// can distinguish "gone" from "unknown right now".
    async fn fetch_profile(&self, token: &SessionToken)
        -> Result<Option<ProfilePayload>, GateError>;
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// Wire shape of a successful login response. An unknown role string fails
/// deserialization, so tampered or future roles never enter the session.
#[derive(Deserialize)]
struct LoginResponse {
    token: String,
    role: Role,
    profile: ProfilePayload,
}

/// HTTP client for the identity backend's REST contract.
pub struct HttpIdentityBackend {
    client: reqwest::Client,
    login_url: Url,
    profile_url: Url,
}

impl HttpIdentityBackend {
    /// Create a client against the given base URL with a per-request
    /// timeout.
    ///
    /// # Errors
    ///
    /// Fails when the base URL cannot host the endpoint paths or the HTTP
    /// client cannot be constructed.
    pub fn new(base_url: &Url, timeout: Duration) -> Result<Self, GateError> {
        let join = |path: &str| {
            base_url.join(path).map_err(|e| GateError::MalformedResponse {
                reason: format!("Invalid backend URL: {e}"),
            })
        };
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GateError::Internal(anyhow::anyhow!("HTTP client construction: {e}")))?;
        Ok(Self {
            client,
            login_url: join("login")?,
            profile_url: join("profile")?,
        })
    }
}

#[async_trait]
impl IdentityBackend for HttpIdentityBackend {
    async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, GateError> {
        let response = self
            .client
            .post(self.login_url.clone())
            .json(&LoginRequest { email, password })
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED => Err(GateError::InvalidCredentials),
            status if status.is_server_error() => Err(GateError::service_unavailable()),
            status if status.is_success() => {
                let body: LoginResponse = response.json().await?;
                Ok(LoginOutcome {
                    token: SessionToken::new(body.token),
                    role: body.role,
                    profile: body.profile,
                })
            }
            status => Err(GateError::MalformedResponse {
                reason: format!("Unexpected login status: {status}"),
            }),
        }
    }

    async fn fetch_profile(
        &self,
        token: &SessionToken,
    ) -> Result<Option<ProfilePayload>, GateError> {
        let response = self
            .client
            .get(self.profile_url.clone())
            .bearer_auth(token.expose())
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(None),
            status if status.is_server_error() => Err(GateError::service_unavailable()),
            status if status.is_success() => Ok(Some(response.json().await?)),
            status => Err(GateError::MalformedResponse {
                reason: format!("Unexpected profile status: {status}"),
            }),
        }
    }
}

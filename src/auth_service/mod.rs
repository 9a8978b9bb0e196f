//! Client side of the external authentication service.
//!
//! The service owns credentials, session issuance and storage. This crate only
//! asks two things of it: "is there a session for these headers?" and "create
//! this account". Request headers are handed over untouched so cookie parsing
//! stays on the service side.

mod client;
mod types;

pub use self::client::{AuthServiceConfig, HttpAuthService};

use async_trait::async_trait;
use axum::http::HeaderMap;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Opaque authenticated principal as reported by the authentication service.
///
/// The gate only looks at whether a session exists; the fields are carried for
/// the pages that display who is signed in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub expires_at: Option<String>,
}

impl Session {
    #[must_use]
    pub fn new(id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            email: None,
            name: None,
            expires_at: None,
        }
    }

    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Best label for the signed-in user: email, then name, then user id.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.email
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or(&self.user_id)
    }
}

/// Account creation payload. The password never leaves a `SecretString` until
/// it is serialized onto the wire.
#[derive(Clone, Debug)]
pub struct SignUpRequest {
    pub name: String,
    pub email: String,
    pub password: SecretString,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum AuthServiceError {
    #[error("auth service unreachable: {0}")]
    Transport(String),
    #[error("auth service returned {status}: {message}")]
    Unexpected { status: u16, message: String },
    #[error("auth service rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("invalid auth service response: {0}")]
    InvalidResponse(String),
    #[error("invalid auth service configuration: {0}")]
    Config(String),
}

/// Fixed interface to the authentication service.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Look up the session identified by the request headers.
    ///
    /// Returns `Ok(None)` when the headers carry no valid session.
    async fn get_session(&self, headers: &HeaderMap) -> Result<Option<Session>, AuthServiceError>;

    /// Create an account. `Rejected` carries the service's user-facing message.
    async fn sign_up(&self, request: &SignUpRequest) -> Result<(), AuthServiceError>;
}

pub type SharedAuthService = Arc<dyn AuthService>;

//! Axum extractors that apply the session gate before a handler runs.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use super::{Redirect, require_auth, require_unauth};
use crate::auth_service::{AuthServiceError, Session, SharedAuthService};

/// Signed-in session for protected pages. Rejects with a redirect to `/login`.
#[derive(Clone, Debug)]
pub struct Authenticated(pub Session);

/// Marker for login-only pages. Rejects with a redirect to `/workflows`.
#[derive(Clone, Copy, Debug)]
pub struct Unauthenticated;

#[derive(Debug, Error)]
pub enum GateRejection {
    #[error("redirect to {}", .0.path())]
    Redirect(Redirect),
    #[error(transparent)]
    Service(#[from] AuthServiceError),
    #[error("auth service is not configured")]
    MissingService,
}

impl From<Redirect> for GateRejection {
    fn from(redirect: Redirect) -> Self {
        Self::Redirect(redirect)
    }
}

impl IntoResponse for GateRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Redirect(redirect) => redirect.into_response(),
            Self::Service(err) => {
                error!("Session lookup failed: {err}");
                (
                    StatusCode::BAD_GATEWAY,
                    "Authentication service unavailable",
                )
                    .into_response()
            }
            Self::MissingService => {
                error!("Auth service extension missing from router");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

fn auth_service(parts: &Parts) -> Result<SharedAuthService, GateRejection> {
    parts
        .extensions
        .get::<SharedAuthService>()
        .cloned()
        .ok_or(GateRejection::MissingService)
}

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = GateRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let service = auth_service(parts)?;
        let session = require_auth(service.as_ref(), &parts.headers)
            .await?
            .into_result()?;
        Ok(Self(session))
    }
}

impl<S> FromRequestParts<S> for Unauthenticated
where
    S: Send + Sync,
{
    type Rejection = GateRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let service = auth_service(parts)?;
        require_unauth(service.as_ref(), &parts.headers)
            .await?
            .into_result()?;
        Ok(Self)
    }
}

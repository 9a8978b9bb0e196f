//! Session gate: permit or redirect a request based on session presence.
//!
//! Flow Overview: look the session up once through the authentication service,
//! then branch on the gate mode. Protected pages send visitors without a session
//! to `/login`; login-only pages send signed-in users to `/workflows`. The
//! redirect is returned as a value so the caller decides how to end the response.
//! Lookup failures propagate unchanged; they are never retried or turned into a
//! redirect.

mod extract;

pub use self::extract::{Authenticated, GateRejection, Unauthenticated};

use axum::{
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use tracing::{debug, instrument};

use crate::auth_service::{AuthService, AuthServiceError, Session};

pub const LOGIN_PATH: &str = "/login";
pub const WORKFLOWS_PATH: &str = "/workflows";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateMode {
    RequireAuthenticated,
    RequireUnauthenticated,
}

impl GateMode {
    /// Destination used when the request does not satisfy this mode.
    #[must_use]
    pub const fn redirect_path(self) -> &'static str {
        match self {
            Self::RequireAuthenticated => LOGIN_PATH,
            Self::RequireUnauthenticated => WORKFLOWS_PATH,
        }
    }

    /// Branch on a completed lookup.
    pub fn decide(self, session: Option<Session>) -> GateOutcome<Option<Session>> {
        match (self, session) {
            (Self::RequireAuthenticated, Some(session)) => GateOutcome::Proceed(Some(session)),
            (Self::RequireUnauthenticated, None) => GateOutcome::Proceed(None),
            (Self::RequireAuthenticated, None) | (Self::RequireUnauthenticated, Some(_)) => {
                GateOutcome::Redirect(Redirect::to(self.redirect_path()))
            }
        }
    }
}

/// Terminal redirect to a fixed in-app path. Renders as `303 See Other`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Redirect {
    path: &'static str,
}

impl Redirect {
    #[must_use]
    pub const fn to(path: &'static str) -> Self {
        Self { path }
    }

    #[must_use]
    pub const fn path(&self) -> &'static str {
        self.path
    }
}

impl IntoResponse for Redirect {
    fn into_response(self) -> Response {
        axum::response::Redirect::to(self.path).into_response()
    }
}

/// Tagged gate result: either continue with a value or stop with a redirect.
#[must_use]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GateOutcome<T> {
    Proceed(T),
    Redirect(Redirect),
}

impl<T> GateOutcome<T> {
    /// Turn the outcome into a `Result` so handlers can stop with `?`.
    ///
    /// # Errors
    /// Returns the redirect when the gate did not let the request through.
    pub fn into_result(self) -> Result<T, Redirect> {
        match self {
            Self::Proceed(value) => Ok(value),
            Self::Redirect(redirect) => Err(redirect),
        }
    }

    #[must_use]
    pub const fn is_redirect(&self) -> bool {
        matches!(self, Self::Redirect(_))
    }
}

/// Shared lookup-and-branch primitive behind both gate entry points.
///
/// # Errors
/// Returns the authentication service error unchanged when the lookup fails.
#[instrument(skip_all, fields(mode = ?mode))]
pub async fn resolve<S>(
    service: &S,
    headers: &HeaderMap,
    mode: GateMode,
) -> Result<GateOutcome<Option<Session>>, AuthServiceError>
where
    S: AuthService + ?Sized,
{
    let session = service.get_session(headers).await?;
    let outcome = mode.decide(session);

    if let GateOutcome::Redirect(redirect) = &outcome {
        debug!(path = redirect.path(), "session gate redirect");
    }

    Ok(outcome)
}

/// Gate for protected pages: yields the session or a redirect to `/login`.
///
/// # Errors
/// Returns the authentication service error unchanged when the lookup fails.
pub async fn require_auth<S>(
    service: &S,
    headers: &HeaderMap,
) -> Result<GateOutcome<Session>, AuthServiceError>
where
    S: AuthService + ?Sized,
{
    let outcome = resolve(service, headers, GateMode::RequireAuthenticated).await?;

    Ok(match outcome {
        GateOutcome::Proceed(Some(session)) => GateOutcome::Proceed(session),
        GateOutcome::Proceed(None) => GateOutcome::Redirect(Redirect::to(LOGIN_PATH)),
        GateOutcome::Redirect(redirect) => GateOutcome::Redirect(redirect),
    })
}

/// Gate for login-only pages: yields `None` or a redirect to `/workflows`.
///
/// # Errors
/// Returns the authentication service error unchanged when the lookup fails.
pub async fn require_unauth<S>(
    service: &S,
    headers: &HeaderMap,
) -> Result<GateOutcome<Option<Session>>, AuthServiceError>
where
    S: AuthService + ?Sized,
{
    resolve(service, headers, GateMode::RequireUnauthenticated).await
}

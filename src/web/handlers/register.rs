//! Registration page.
//!
//! Flow Overview: validate the form locally, submit it to the authentication
//! service, and wait for the outcome before navigating. Success redirects to the
//! sign-in page with a notice; a rejection re-renders the form with the service's
//! message. Passwords are never echoed back or logged.

use axum::{
    Form,
    extract::Extension,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use minijinja::context;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::{
    auth_service::{AuthServiceError, SharedAuthService},
    gate::{Redirect, Unauthenticated},
    web::{
        forms::{FieldErrors, RegisterForm},
        pages::{PageError, Pages},
    },
};

pub const REGISTERED_LOGIN_PATH: &str = "/login?registered=1";

#[derive(Debug, Error)]
pub enum RegisterError {
    #[error(transparent)]
    Page(#[from] PageError),
    #[error(transparent)]
    Service(#[from] AuthServiceError),
}

impl IntoResponse for RegisterError {
    fn into_response(self) -> Response {
        match self {
            Self::Page(err) => err.into_response(),
            Self::Service(err) => {
                error!("Sign-up failed: {err}");
                (
                    StatusCode::BAD_GATEWAY,
                    "Authentication service unavailable",
                )
                    .into_response()
            }
        }
    }
}

fn render_form(
    pages: &Pages,
    email: &str,
    errors: &FieldErrors,
    failure: Option<String>,
) -> Result<Html<String>, PageError> {
    pages.render(
        "register.html",
        context! { email, errors, failure },
    )
}

pub async fn register_form(
    _guard: Unauthenticated,
    pages: Extension<Arc<Pages>>,
) -> Result<Html<String>, PageError> {
    render_form(&pages, "", &FieldErrors::default(), None)
}

pub async fn register(
    _guard: Unauthenticated,
    pages: Extension<Arc<Pages>>,
    service: Extension<SharedAuthService>,
    Form(form): Form<RegisterForm>,
) -> Result<Response, RegisterError> {
    let errors = form.validate();
    if !errors.is_empty() {
        let body = render_form(&pages, &form.email, &errors, None)?;
        return Ok((StatusCode::UNPROCESSABLE_ENTITY, body).into_response());
    }

    let email = form.email.clone();
    let request = form.into_sign_up();

    match service.sign_up(&request).await {
        Ok(()) => {
            info!("Registration accepted");
            Ok(Redirect::to(REGISTERED_LOGIN_PATH).into_response())
        }
        Err(AuthServiceError::Rejected { status, message }) => {
            warn!("Registration rejected ({status})");
            let failure = format!("Registration failed: {message}");
            let body = render_form(&pages, &email, &FieldErrors::default(), Some(failure))?;
            Ok((StatusCode::UNPROCESSABLE_ENTITY, body).into_response())
        }
        Err(err) => Err(err.into()),
    }
}

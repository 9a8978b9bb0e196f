//! Registration form input and validation.

use once_cell::sync::Lazy;
use regex::Regex;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::auth_service::SignUpRequest;

pub const MIN_PASSWORD_LENGTH: usize = 6;

pub const INVALID_EMAIL: &str = "Invalid email address";
pub const PASSWORD_TOO_SHORT: &str = "Password must be at least 6 characters";
pub const PASSWORDS_DO_NOT_MATCH: &str = "Passwords do not match";

static EMAIL_RE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").ok());

pub fn valid_email(email: &str) -> bool {
    EMAIL_RE.as_ref().is_some_and(|re| re.is_match(email))
}

/// Raw `application/x-www-form-urlencoded` registration input.
#[derive(Clone, Default, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default, rename = "confirmPassword")]
    pub confirm_password: String,
}

impl std::fmt::Debug for RegisterForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterForm")
            .field("email", &self.email)
            .field("password", &"***")
            .field("confirm_password", &"***")
            .finish()
    }
}

/// First failing rule per field, rendered next to the matching input.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors {
    pub email: Option<&'static str>,
    pub password: Option<&'static str>,
    pub confirm_password: Option<&'static str>,
}

impl FieldErrors {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.password.is_none() && self.confirm_password.is_none()
    }
}

impl RegisterForm {
    #[must_use]
    pub fn validate(&self) -> FieldErrors {
        FieldErrors {
            email: (!valid_email(&self.email)).then_some(INVALID_EMAIL),
            password: (self.password.chars().count() < MIN_PASSWORD_LENGTH)
                .then_some(PASSWORD_TOO_SHORT),
            confirm_password: (self.password != self.confirm_password)
                .then_some(PASSWORDS_DO_NOT_MATCH),
        }
    }

    /// Build the sign-up payload; the account name defaults to the email.
    #[must_use]
    pub fn into_sign_up(self) -> SignUpRequest {
        SignUpRequest {
            name: self.email.clone(),
            email: self.email,
            password: SecretString::from(self.password),
        }
    }
}

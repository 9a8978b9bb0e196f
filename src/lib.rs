//! # Niagra (session-gated web front end)
//!
//! `niagra` serves the sign-in and registration pages of the Niagra workflow
//! application and gates every page on session presence. Sessions are owned by
//! an external authentication service; this crate only asks whether one exists.
//!
//! ## Session Gate
//!
//! A page declares one of two modes:
//!
//! - **Require authenticated:** a request without a session is redirected to `/login`.
//! - **Require unauthenticated:** a request with a session is redirected to `/workflows`.
//!
//! The gate performs exactly one lookup per request and returns a tagged outcome
//! (`Proceed` or `Redirect`) instead of aborting the call stack. Lookup failures are
//! propagated as errors and never turned into redirects.
//!
//! ## Registration
//!
//! The registration form validates input locally, submits it to the authentication
//! service, and only navigates once the outcome is known.

pub mod auth_service;
pub mod cli;
pub mod gate;
pub mod web;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with("niagra/"));
        assert!(APP_USER_AGENT.ends_with(env!("CARGO_PKG_VERSION")));
    }
}

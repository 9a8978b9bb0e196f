//! Command-line argument dispatch.
//!
//! Maps validated CLI matches to the action the binary executes.

use crate::auth_service::AuthServiceConfig;
use crate::cli::actions::{Action, server::Args};
use crate::cli::commands::auth;
use anyhow::{Context, Result};
use std::time::Duration;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or the auth URL is invalid.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);

    let auth_opts = auth::Options::parse(matches)?;
    let auth_config = AuthServiceConfig::parse(&auth_opts.url)
        .context("invalid NIAGRA_AUTH_URL")?
        .with_base_path(auth_opts.base_path)
        .with_timeout(Duration::from_secs(auth_opts.timeout_seconds));

    Ok(Action::Server(Args { port, auth_config }))
}

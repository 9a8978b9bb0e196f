use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};

pub const ARG_AUTH_URL: &str = "auth-url";
pub const ARG_AUTH_BASE_PATH: &str = "auth-base-path";
pub const ARG_AUTH_TIMEOUT_SECONDS: &str = "auth-timeout-seconds";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub url: String,
    pub base_path: String,
    pub timeout_seconds: u64,
}

impl Options {
    /// Read authentication service options from validated matches.
    ///
    /// # Errors
    /// Returns an error if the service URL is missing.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let url = matches
            .get_one::<String>(ARG_AUTH_URL)
            .cloned()
            .context("missing required argument: --auth-url")?;
        let base_path = matches
            .get_one::<String>(ARG_AUTH_BASE_PATH)
            .cloned()
            .unwrap_or_else(|| "/api/auth".to_string());
        let timeout_seconds = matches
            .get_one::<u64>(ARG_AUTH_TIMEOUT_SECONDS)
            .copied()
            .unwrap_or(10);

        Ok(Self {
            url,
            base_path,
            timeout_seconds,
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_AUTH_URL)
                .long(ARG_AUTH_URL)
                .help("Authentication service base URL, example: https://auth.niagra.dev")
                .env("NIAGRA_AUTH_URL")
                .required(true),
        )
        .arg(
            Arg::new(ARG_AUTH_BASE_PATH)
                .long(ARG_AUTH_BASE_PATH)
                .help("Path prefix of the authentication API")
                .env("NIAGRA_AUTH_BASE_PATH")
                .default_value("/api/auth"),
        )
        .arg(
            Arg::new(ARG_AUTH_TIMEOUT_SECONDS)
                .long(ARG_AUTH_TIMEOUT_SECONDS)
                .help("Timeout for authentication service calls in seconds")
                .env("NIAGRA_AUTH_TIMEOUT_SECONDS")
                .default_value("10")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
}

use crate::{
    auth_service::{AuthServiceConfig, HttpAuthService, SharedAuthService},
    web,
};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub auth_config: AuthServiceConfig,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the auth client cannot be built or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    debug!("Server args: {:?}", args);

    let service = HttpAuthService::new(&args.auth_config)
        .context("Failed to build authentication service client")?;

    debug!("Session lookups go to {}", service.session_url());

    let service: SharedAuthService = Arc::new(service);

    web::serve(args.port, service).await
}

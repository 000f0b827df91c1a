//! Serve command - Starts the HTTP server.

use crate::api::{create_router, AppState};
use crate::cli::args::ServeArgs;
use crate::config::Config;
use crate::errors::{AppError, AppResult};

/// Execute the serve command
pub async fn execute(args: ServeArgs, config: Config) -> AppResult<()> {
    tracing::info!("Starting server...");

    // Directory and mail are contacted per request, not at startup
    let app_state = AppState::from_config(&config)?;
    tracing::info!(
        url = %config.directory.url,
        ldap_path = %config.ldap_path,
        smtp = config.mail.smtp_host.is_some(),
        "Services configured"
    );
    if config.ldap_path.trim().is_empty() {
        tracing::warn!("USERS_LDAP_PATH is not set - user creation will be rejected");
    }

    // Build router
    let app = create_router(app_state);

    // Start server
    let host = args.host.unwrap_or(config.server_host);
    let port = args.port.unwrap_or(config.server_port);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind to {}: {}", addr, e)))?;

    tracing::info!("Server running on http://{}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    Ok(())
}

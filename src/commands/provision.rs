//! Create-user command - Provisions a user from the command line.

use crate::cli::args::CreateUserArgs;
use crate::config::Config;
use crate::domain::{CreateUserRequest, NotificationStatus};
use crate::errors::{AppError, AppResult};
use crate::services::{ServiceContainer, Services};

/// Execute the create-user command
pub async fn execute(args: CreateUserArgs, config: Config) -> AppResult<()> {
    let services = Services::from_config(&config)?;

    let mut request = CreateUserRequest::new(args.account_name, args.display_name, args.email);
    if let Some(created_by) = args.created_by {
        request = request.with_created_by(created_by);
    }

    let outcome = services.provisioning().create_user(request).await?;

    if let NotificationStatus::Failed { reason } = &outcome.notification {
        tracing::warn!(%reason, "Administrators were not notified");
    }

    let json = serde_json::to_string_pretty(&outcome)
        .map_err(|e| AppError::internal(format!("Failed to serialize outcome: {}", e)))?;
    println!("{}", json);
    Ok(())
}

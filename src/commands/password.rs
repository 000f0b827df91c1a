//! Password command - Prints a generated password.

use crate::cli::args::PasswordArgs;
use crate::config::{Config, PasswordPolicy};
use crate::domain::Password;
use crate::errors::AppResult;

/// Execute the password command
pub async fn execute(args: PasswordArgs, config: Config) -> AppResult<()> {
    let policy = policy_for(&args, config.password_policy);
    let password = Password::from_policy(&policy)?;

    println!("{}", password.expose());
    Ok(())
}

/// Apply command-line overrides to the configured policy
fn policy_for(args: &PasswordArgs, configured: PasswordPolicy) -> PasswordPolicy {
    PasswordPolicy {
        length: args.length.unwrap_or(configured.length),
        min_non_alphanumeric: args
            .min_non_alphanumeric
            .unwrap_or(configured.min_non_alphanumeric),
    }
}

//! Directory commands - Lookups, group membership and connectivity.

use serde::Serialize;

use crate::cli::args::{GroupsArgs, LookupArgs, LookupKind};
use crate::config::Config;
use crate::domain::Principal;
use crate::errors::{AppError, AppResult};
use crate::infra::{DirectoryAccess, LdapDirectory};

/// Execute the lookup command
pub async fn lookup(args: LookupArgs, config: Config) -> AppResult<()> {
    let directory = LdapDirectory::new(config.directory)?;
    let principal = find(&directory, &args).await?.ok_or(AppError::NotFound)?;
    print_json(&principal)
}

/// Execute the groups command
pub async fn groups(args: GroupsArgs, config: Config) -> AppResult<()> {
    let directory = LdapDirectory::new(config.directory)?;
    let user = directory
        .find_user_by_sam_account_name(&args.account_name, args.path.as_deref())
        .await?
        .ok_or(AppError::NotFound)?;

    let groups = directory.list_groups(&Principal::User(user)).await?;
    tracing::debug!(count = groups.len(), "Groups found");
    print_json(&groups)
}

/// Execute the ping command
pub async fn ping(config: Config) -> AppResult<()> {
    let directory = LdapDirectory::new(config.directory)?;
    directory.ping().await?;
    println!("Directory bind succeeded ({})", directory.base_dn());
    Ok(())
}

async fn find(
    directory: &dyn DirectoryAccess,
    args: &LookupArgs,
) -> AppResult<Option<Principal>> {
    let identity = args.identity.as_str();
    let path = args.path.as_deref();

    let principal = match args.kind {
        LookupKind::UserCn => directory
            .find_user_by_common_name(identity, path)
            .await?
            .map(Principal::from),
        LookupKind::UserDn => directory
            .find_user_by_distinguished_name(identity)
            .await?
            .map(Principal::from),
        LookupKind::UserSam => directory
            .find_user_by_sam_account_name(identity, path)
            .await?
            .map(Principal::from),
        LookupKind::Computer => directory
            .find_computer(identity, path)
            .await?
            .map(Principal::from),
        LookupKind::Group => directory
            .find_group(identity, path)
            .await?
            .map(Principal::from),
    };
    Ok(principal)
}

fn print_json<T: Serialize>(value: &T) -> AppResult<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| AppError::internal(format!("Failed to serialize result: {}", e)))?;
    println!("{}", json);
    Ok(())
}

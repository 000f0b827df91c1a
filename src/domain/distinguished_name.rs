//! Distinguished name helpers.

use crate::errors::{AppError, AppResult};

/// Extract the common name from a user's distinguished name.
///
/// The CN is everything between the leading `CN=` and the first `OU=`
/// component, with the separating comma and any backslash escapes removed:
/// `CN=Doe\, Jane,OU=Sales,DC=example,DC=com` yields `Doe, Jane`.
///
/// # Errors
/// Returns `InvalidArgument` if the DN does not start with `CN=` or has no
/// `OU=` component after it.
pub fn common_name_from_dn(distinguished_name: &str) -> AppResult<String> {
    let dn = distinguished_name.trim();

    let starts_with_cn = dn
        .get(..3)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("CN="));
    if !starts_with_cn {
        return Err(AppError::invalid_argument(format!(
            "Distinguished name '{}' does not start with CN=",
            distinguished_name
        )));
    }

    let org_unit_index = dn
        .to_ascii_uppercase()
        .find("OU=")
        .ok_or_else(|| {
            AppError::invalid_argument(format!(
                "Distinguished name '{}' has no OU= component",
                distinguished_name
            ))
        })?;

    let raw = dn[3..org_unit_index].trim_end();
    let raw = raw.strip_suffix(',').unwrap_or(raw).trim_end();
    if raw.is_empty() {
        return Err(AppError::invalid_argument(format!(
            "Distinguished name '{}' has an empty CN",
            distinguished_name
        )));
    }

    Ok(raw.replace('\\', ""))
}

/// Convert a DNS domain into the base DN of its naming context.
///
/// `corp.example.com` yields `DC=corp,DC=example,DC=com`.
pub fn base_dn_from_domain(domain: &str) -> AppResult<String> {
    let labels: Vec<&str> = domain
        .trim()
        .trim_end_matches('.')
        .split('.')
        .collect();

    if labels.iter().any(|label| label.is_empty()) {
        return Err(AppError::invalid_argument(format!(
            "'{}' is not a valid domain name",
            domain
        )));
    }

    Ok(labels
        .iter()
        .map(|label| format!("DC={}", label))
        .collect::<Vec<_>>()
        .join(","))
}

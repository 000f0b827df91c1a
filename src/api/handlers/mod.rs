//! HTTP request handlers.

use axum::http::HeaderMap;

use crate::config::REMOTE_USER_HEADER;

pub mod create_user_view;
pub mod user_handler;

pub use create_user_view::create_user_routes;
pub use user_handler::user_routes;

/// Operator name set by the fronting proxy, if any.
pub(crate) fn remote_user(headers: &HeaderMap) -> Option<String> {
    headers
        .get(REMOTE_USER_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

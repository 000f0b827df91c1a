//! User provisioning JSON API.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::post,
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use super::remote_user;
use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::config::MAX_ACCOUNT_NAME_LENGTH;
use crate::domain::{CreateUserRequest, ProvisioningOutcome};
use crate::errors::AppResult;

/// User creation request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUserBody {
    /// Pre-Windows 2000 logon name (sAMAccountName)
    #[validate(length(
        min = 1,
        max = MAX_ACCOUNT_NAME_LENGTH,
        message = "Account name must be 1 to 20 characters"
    ))]
    #[schema(example = "jdoe", max_length = 20)]
    pub account_name: String,
    #[serde(default)]
    #[schema(example = "Jane Doe")]
    pub display_name: String,
    #[serde(default)]
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "jane@example.com")]
    pub email_address: Option<String>,
}

/// Create user routes
pub fn user_routes() -> Router<AppState> {
    Router::new().route("/", post(create_user))
}

/// Create a directory user and notify administrators
#[utoipa::path(
    post,
    path = "/api/users",
    tag = "Users",
    request_body = CreateUserBody,
    params(
        (
            "X-Remote-User" = Option<String>,
            Header,
            description = "Operator set by the fronting proxy"
        )
    ),
    responses(
        (status = 201, description = "User created", body = ProvisioningOutcome),
        (status = 400, description = "Validation error"),
        (status = 502, description = "Directory rejected the request"),
        (status = 503, description = "Directory unavailable")
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    ValidatedJson(payload): ValidatedJson<CreateUserBody>,
) -> AppResult<(StatusCode, Json<ProvisioningOutcome>)> {
    let mut request = CreateUserRequest::new(
        payload.account_name,
        payload.display_name,
        payload.email_address.unwrap_or_default(),
    );
    if let Some(user) = remote_user(&headers) {
        request = request.with_created_by(user);
    }

    let outcome = state.provisioning.create_user(request).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

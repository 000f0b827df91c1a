//! Create-user form pages.
//!
//! `POST /Users/Create` always answers with a redirect back to the form;
//! the outcome travels in the query string and is shown as a banner.

use askama::Template;
use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use serde::Deserialize;
use url::form_urlencoded;
use validator::{Validate, ValidateEmail, ValidationError, ValidationErrors};

use super::remote_user;
use crate::api::extractors::format_validation_errors;
use crate::api::AppState;
use crate::config::MAX_ACCOUNT_NAME_LENGTH;
use crate::domain::{CreateUserRequest, NotificationStatus, ProvisioningOutcome};
use crate::errors::{AppError, AppResult};

pub const CREATE_USER_PATH: &str = "/Users/Create";

/// Create the form routes
pub fn create_user_routes() -> Router<AppState> {
    Router::new().route(CREATE_USER_PATH, get(show_form).post(submit_form))
}

/// Fields posted by the create-user form
#[derive(Debug, Default, Deserialize, Validate)]
pub struct CreateUserForm {
    #[serde(rename = "AccountName", default)]
    #[validate(length(
        min = 1,
        max = MAX_ACCOUNT_NAME_LENGTH,
        message = "Account name must be 1 to 20 characters"
    ))]
    pub account_name: String,
    #[serde(rename = "DisplayName", default)]
    pub display_name: String,
    #[serde(rename = "EmailAddress", default)]
    #[validate(custom(function = "optional_email"))]
    pub email_address: String,
}

fn optional_email(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() || value.trim().validate_email() {
        Ok(())
    } else {
        let mut err = ValidationError::new("email");
        err.message = Some("Invalid email format".into());
        Err(err)
    }
}

impl CreateUserForm {
    fn trimmed(self) -> Self {
        Self {
            account_name: self.account_name.trim().to_string(),
            display_name: self.display_name.trim().to_string(),
            email_address: self.email_address.trim().to_string(),
        }
    }
}

/// Outcome of a form submission, as carried in the redirect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionStatus {
    Created,
    NotifyFailed,
    Invalid,
    Failed,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Created => "created",
            SubmissionStatus::NotifyFailed => "notify_failed",
            SubmissionStatus::Invalid => "invalid",
            SubmissionStatus::Failed => "failed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "created" => Some(SubmissionStatus::Created),
            "notify_failed" => Some(SubmissionStatus::NotifyFailed),
            "invalid" => Some(SubmissionStatus::Invalid),
            "failed" => Some(SubmissionStatus::Failed),
            _ => None,
        }
    }
}

/// Why a submission was not completed. Only these fixed codes travel in
/// the redirect, so the banner never echoes caller-supplied text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    InvalidAccountName,
    InvalidEmail,
    InvalidRequest,
    DirectoryUnavailable,
    DirectoryRejected,
    Internal,
}

impl FailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureReason::InvalidAccountName => "account_name",
            FailureReason::InvalidEmail => "email_address",
            FailureReason::InvalidRequest => "invalid_request",
            FailureReason::DirectoryUnavailable => "directory_unavailable",
            FailureReason::DirectoryRejected => "directory_rejected",
            FailureReason::Internal => "internal",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "account_name" => Some(FailureReason::InvalidAccountName),
            "email_address" => Some(FailureReason::InvalidEmail),
            "invalid_request" => Some(FailureReason::InvalidRequest),
            "directory_unavailable" => Some(FailureReason::DirectoryUnavailable),
            "directory_rejected" => Some(FailureReason::DirectoryRejected),
            "internal" => Some(FailureReason::Internal),
            _ => None,
        }
    }

    fn text(&self) -> &'static str {
        match self {
            FailureReason::InvalidAccountName => "Account name must be 1 to 20 characters.",
            FailureReason::InvalidEmail => "Email address is not valid.",
            FailureReason::InvalidRequest => "The request was rejected by the service.",
            FailureReason::DirectoryUnavailable => "The directory service is unavailable.",
            FailureReason::DirectoryRejected => "The directory service rejected the request.",
            FailureReason::Internal => "An internal error occurred.",
        }
    }

    /// First failing field, account name before email.
    fn from_validation(errors: &ValidationErrors) -> Self {
        let fields = errors.field_errors();
        if fields.contains_key("account_name") {
            FailureReason::InvalidAccountName
        } else if fields.contains_key("email_address") {
            FailureReason::InvalidEmail
        } else {
            FailureReason::InvalidRequest
        }
    }

    fn from_error(error: &AppError) -> (SubmissionStatus, Self) {
        match error {
            AppError::InvalidArgument(_) | AppError::Validation(_) => {
                (SubmissionStatus::Invalid, FailureReason::InvalidRequest)
            }
            AppError::DirectoryConnection { .. } => {
                (SubmissionStatus::Failed, FailureReason::DirectoryUnavailable)
            }
            AppError::DirectoryOperation(_) => {
                (SubmissionStatus::Failed, FailureReason::DirectoryRejected)
            }
            AppError::NotFound | AppError::Notification(_) | AppError::Internal(_) => {
                (SubmissionStatus::Failed, FailureReason::Internal)
            }
        }
    }
}

/// Query string read back by the form page
#[derive(Debug, Default, Deserialize)]
pub struct BannerQuery {
    pub status: Option<String>,
    pub account: Option<String>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub kind: &'static str,
    pub text: String,
}

impl Banner {
    fn from_query(query: &BannerQuery) -> Option<Self> {
        let status = SubmissionStatus::parse(query.status.as_deref()?)?;
        // Names longer than any valid account are not shown
        let account = query
            .account
            .as_deref()
            .filter(|account| account.chars().count() as u64 <= MAX_ACCOUNT_NAME_LENGTH)
            .unwrap_or_default();
        let reason = query
            .reason
            .as_deref()
            .and_then(FailureReason::parse)
            .map(|reason| reason.text())
            .unwrap_or("Unknown error.");

        let banner = match status {
            SubmissionStatus::Created => Banner {
                kind: "success",
                text: format!("User {} was created.", account),
            },
            SubmissionStatus::NotifyFailed => Banner {
                kind: "warning",
                text: format!(
                    "User {} was created, but the administrators could not be notified.",
                    account
                ),
            },
            SubmissionStatus::Invalid => Banner {
                kind: "error",
                text: format!("Please correct the form: {}", reason),
            },
            SubmissionStatus::Failed => Banner {
                kind: "error",
                text: format!("User could not be created: {}", reason),
            },
        };
        Some(banner)
    }
}

#[derive(Template)]
#[template(path = "create_user.html")]
struct CreateUserPage {
    banner: Option<Banner>,
    max_account_name_length: u64,
}

struct HtmlTemplate<T>(T);

/// Render an askama template into an HTML response
impl<T> IntoResponse for HtmlTemplate<T>
where
    T: Template,
{
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(html) => Html(html).into_response(),
            Err(err) => {
                tracing::error!(error = %err, "Failed to render template");
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to render page").into_response()
            }
        }
    }
}

/// Show the create-user form
pub async fn show_form(Query(query): Query<BannerQuery>) -> impl IntoResponse {
    HtmlTemplate(CreateUserPage {
        banner: Banner::from_query(&query),
        max_account_name_length: MAX_ACCOUNT_NAME_LENGTH,
    })
}

/// Create the user and redirect back to the form
pub async fn submit_form(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<CreateUserForm>,
) -> Redirect {
    let form = form.trimmed();

    if let Err(errors) = form.validate() {
        tracing::debug!(errors = %format_validation_errors(&errors), "Form rejected");
        return redirect_to_form(
            SubmissionStatus::Invalid,
            &form.account_name,
            Some(FailureReason::from_validation(&errors)),
        );
    }

    let mut request = CreateUserRequest::new(
        form.account_name.clone(),
        form.display_name,
        form.email_address,
    );
    if let Some(user) = remote_user(&headers) {
        request = request.with_created_by(user);
    }

    let result = state.provisioning.create_user(request).await;
    redirect_for_result(&form.account_name, &result)
}

/// Map a provisioning result to the redirect carrying its banner.
pub fn redirect_for_result(
    account_name: &str,
    result: &AppResult<ProvisioningOutcome>,
) -> Redirect {
    match result {
        Ok(outcome) => {
            let status = match outcome.notification {
                NotificationStatus::Sent => SubmissionStatus::Created,
                NotificationStatus::Failed { .. } => SubmissionStatus::NotifyFailed,
            };
            redirect_to_form(status, &outcome.account_name, None)
        }
        Err(e) => {
            tracing::warn!(account = %account_name, error = %e, "User creation failed");
            let (status, reason) = FailureReason::from_error(e);
            redirect_to_form(status, account_name, Some(reason))
        }
    }
}

fn redirect_to_form(
    status: SubmissionStatus,
    account: &str,
    reason: Option<FailureReason>,
) -> Redirect {
    Redirect::to(&form_location(status, account, reason))
}

/// `/Users/Create?status=...` with the query values encoded
pub fn form_location(
    status: SubmissionStatus,
    account: &str,
    reason: Option<FailureReason>,
) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    query.append_pair("status", status.as_str());
    if !account.is_empty() {
        query.append_pair("account", account);
    }
    if let Some(reason) = reason {
        query.append_pair("reason", reason.as_str());
    }
    format!("{}?{}", CREATE_USER_PATH, query.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn outcome(notification: NotificationStatus) -> ProvisioningOutcome {
        ProvisioningOutcome {
            request_id: Uuid::new_v4(),
            account_name: "jdoe".into(),
            distinguished_name: "CN=Jane Doe,OU=Staff,DC=example,DC=com".into(),
            created_at: Utc::now(),
            notification,
        }
    }

    fn location(redirect: Redirect) -> String {
        let response = redirect.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        response.headers()["location"].to_str().unwrap().to_string()
    }

    #[test]
    fn test_form_location_encodes_values() {
        assert_eq!(
            form_location(
                SubmissionStatus::Failed,
                "j&doe",
                Some(FailureReason::DirectoryUnavailable)
            ),
            "/Users/Create?status=failed&account=j%26doe&reason=directory_unavailable"
        );
    }

    #[test]
    fn test_created_redirect() {
        let result = Ok(outcome(NotificationStatus::Sent));
        assert_eq!(
            location(redirect_for_result("jdoe", &result)),
            "/Users/Create?status=created&account=jdoe"
        );
    }

    #[test]
    fn test_notify_failed_redirect() {
        let result = Ok(outcome(NotificationStatus::Failed {
            reason: "relay denied".into(),
        }));
        assert_eq!(
            location(redirect_for_result("jdoe", &result)),
            "/Users/Create?status=notify_failed&account=jdoe"
        );
    }

    #[test]
    fn test_upstream_failure_hides_detail() {
        let result = Err(AppError::directory_operation("rc=53 unwillingToPerform"));
        assert_eq!(
            location(redirect_for_result("jdoe", &result)),
            "/Users/Create?status=failed&account=jdoe&reason=directory_rejected"
        );
    }

    #[test]
    fn test_configuration_error_redirects_as_invalid() {
        let result = Err(AppError::invalid_argument("USERS_LDAP_PATH is not configured"));
        assert_eq!(
            location(redirect_for_result("jdoe", &result)),
            "/Users/Create?status=invalid&account=jdoe&reason=invalid_request"
        );
    }

    #[test]
    fn test_banner_ignores_free_text() {
        let query = BannerQuery {
            status: Some("failed".into()),
            account: Some("Call the helpdesk at 555-0100 to verify".into()),
            reason: Some("Your password expired, reply with it".into()),
        };
        let banner = Banner::from_query(&query).unwrap();

        assert_eq!(banner.text, "User could not be created: Unknown error.");
    }

    #[test]
    fn test_banner_reason_text_is_fixed() {
        let query = BannerQuery {
            status: Some("invalid".into()),
            account: Some("jdoe".into()),
            reason: Some("email_address".into()),
        };
        let banner = Banner::from_query(&query).unwrap();

        assert_eq!(banner.text, "Please correct the form: Email address is not valid.");
    }

    #[test]
    fn test_banner_from_query() {
        let query = BannerQuery {
            status: Some("notify_failed".into()),
            account: Some("jdoe".into()),
            reason: None,
        };
        let banner = Banner::from_query(&query).unwrap();
        assert_eq!(banner.kind, "warning");
        assert!(banner.text.contains("jdoe"));

        let unknown = BannerQuery {
            status: Some("bogus".into()),
            ..Default::default()
        };
        assert!(Banner::from_query(&unknown).is_none());
    }

    #[test]
    fn test_form_validation() {
        let form = CreateUserForm {
            account_name: "a-very-long-account-name".into(),
            email_address: "not-an-email".into(),
            ..Default::default()
        };
        let errors = form.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("account_name"));
        assert!(fields.contains_key("email_address"));
        assert_eq!(
            FailureReason::from_validation(&errors),
            FailureReason::InvalidAccountName
        );

        let form = CreateUserForm {
            account_name: "jdoe".into(),
            ..Default::default()
        };
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_page_renders_banner_escaped() {
        let page = CreateUserPage {
            banner: Some(Banner {
                kind: "error",
                text: "<script>".into(),
            }),
            max_account_name_length: MAX_ACCOUNT_NAME_LENGTH,
        };
        let html = page.render().unwrap();

        assert!(html.contains("banner-error"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("name=\"AccountName\""));
    }
}

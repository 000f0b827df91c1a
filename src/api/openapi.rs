//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::OpenApi;

use crate::api::handlers::user_handler;
use crate::domain::ProvisioningOutcome;

/// OpenAPI documentation for the AD provisioner
#[derive(OpenApi)]
#[openapi(
    info(
        title = "AD User Provisioner",
        version = "0.1.0",
        description = "Create Active Directory user accounts and notify administrators",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        user_handler::create_user,
    ),
    components(
        schemas(
            ProvisioningOutcome,
            user_handler::CreateUserBody,
        )
    ),
    tags(
        (name = "Users", description = "Directory user provisioning")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_create_user() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/users"));
    }
}

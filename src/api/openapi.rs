//! OpenAPI documentation configuration.

use utoipa::OpenApi;

use crate::{api, error, models};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Build Test Results Server",
        version = "0.1.0",
        description = "Stores and serves the aggregated unit test results of pipeline builds"
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        api::health::health,
        api::health::ready,
        api::test_results::post_test_results,
        api::test_results::get_test_results,
    ),
    components(
        schemas(
            error::ErrorResponse,
            api::health::HealthResponse,
            api::health::ReadyResponse,
            models::TestDocument,
            models::TestSuite,
            models::StepStatus,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Test Results", description = "Store and read build test results")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Add API key security scheme.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "api_key",
                utoipa::openapi::security::SecurityScheme::ApiKey(
                    utoipa::openapi::security::ApiKey::Header(
                        utoipa::openapi::security::ApiKeyValue::new(crate::config::API_KEY_HEADER),
                    ),
                ),
            );
        }
    }
}

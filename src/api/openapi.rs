//! OpenAPI documentation and schema generation
//!
//! Defines the OpenAPI specification for the study-pathways REST API using
//! utoipa for compile-time spec generation.

use utoipa::OpenApi;

/// OpenAPI documentation for the study-pathways REST API
///
/// The spec can be accessed via:
/// - `/openapi.json` - JSON format OpenAPI specification
/// - `/swagger-ui` - Interactive Swagger UI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "study-pathways REST API",
        version = "0.1.0",
        description = "Study pathway generation and supplementary content aggregation with asynchronous task polling",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        // Content
        crate::api::routes::initiate_content_generation,
        crate::api::routes::check_content_status,
        crate::api::routes::generate_content,

        // Pathway
        crate::api::routes::study_pathway,

        // Documents
        crate::api::routes::upload_pdf,

        // System
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
        crate::api::routes::event_stream,
    ),
    components(schemas(
        // Core types from types.rs
        crate::types::TaskId,
        crate::types::InitiateResponse,
        crate::types::TaskStatusResponse,
        crate::types::TaskFailure,
        crate::types::DocumentInsights,
        crate::types::Event,

        // Config types from config.rs
        crate::config::Config,
        crate::config::ProviderConfig,
        crate::config::TaskConfig,
        crate::config::PathwayConfig,
        crate::config::PollerConfig,
        crate::config::RetryConfig,
        crate::config::UploadConfig,
        crate::config::ServerIntegrationConfig,
        crate::config::ApiConfig,
        crate::config::RateLimitConfig,

        // API response types from routes
        crate::api::routes::HealthResponse,

        // Error types from error.rs
        crate::error::ApiError,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "content", description = "Stage content - Initiate background generation, poll task status, or generate synchronously"),
        (name = "pathway", description = "Study pathways - Multi-stage curriculum outlines for a topic and level"),
        (name = "documents", description = "Documents - Infer topic and level from an uploaded PDF"),
        (name = "system", description = "System endpoints - Health checks, OpenAPI spec, events"),
    )
)]
pub struct ApiDoc;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_spec_lists_every_route() {
        let spec = ApiDoc::openapi();
        for path in [
            "/initiate-content-generation",
            "/check-content-status",
            "/generate-content",
            "/study-pathway",
            "/upload-pdf",
            "/health",
            "/openapi.json",
            "/events",
        ] {
            assert!(spec.paths.paths.contains_key(path), "missing {path}");
        }
    }

    #[test]
    fn test_openapi_spec_has_components() {
        let spec = ApiDoc::openapi();
        let components = spec.components.expect("components should be defined");

        for schema in ["InitiateResponse", "TaskStatusResponse", "ApiError", "Config"] {
            assert!(
                components.schemas.contains_key(schema),
                "missing schema {schema}"
            );
        }
    }

    #[test]
    fn test_openapi_spec_serializes_to_json() {
        let json = ApiDoc::openapi().to_json().unwrap();
        assert!(json.contains("study-pathways REST API"));
        assert!(json.contains("taskId"));
    }
}

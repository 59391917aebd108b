//! REST API server module
//!
//! Serves stage content generation (background tasks with status polling, or
//! synchronous), study pathways, document upload and system endpoints.

use crate::{Config, Result, StudyHub};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod error_response;
pub mod openapi;
pub mod rate_limit;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::AppState;

/// Multipart framing allowance on top of the configured document size
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Create the API router with all route definitions
///
/// # Routes
///
/// ## Content (rate limited)
/// - `GET /initiate-content-generation` - Start a background generation, returns `{taskId}`
/// - `GET /generate-content` - Generate content and return the HTML fragment
///
/// ## Content status
/// - `GET /check-content-status` - Poll a task
///
/// ## Pathway (rate limited)
/// - `GET /study-pathway` - Study pathway HTML
///
/// ## Documents (rate limited)
/// - `POST /upload-pdf` - Infer topic and level from a PDF
///
/// ## System
/// - `GET /health` - Health check
/// - `GET /openapi.json` - OpenAPI specification
/// - `GET /swagger-ui` - Interactive Swagger UI documentation (if enabled)
/// - `GET /api-docs/openapi.json` - OpenAPI specification served to Swagger UI (if enabled)
/// - `GET /events` - Server-sent events stream
pub fn create_router(hub: Arc<StudyHub>, config: Arc<Config>) -> Router {
    let state = AppState::new(hub, config.clone());

    // Routes that reach an external provider
    let generation = Router::new()
        .route(
            "/initiate-content-generation",
            get(routes::initiate_content_generation),
        )
        .route("/generate-content", get(routes::generate_content))
        .route("/study-pathway", get(routes::study_pathway))
        .route(
            "/upload-pdf",
            post(routes::upload_pdf).layer(DefaultBodyLimit::max(
                config
                    .upload
                    .max_bytes
                    .saturating_add(MULTIPART_OVERHEAD_BYTES),
            )),
        );

    // Rate limiting covers the generation routes only; polling must never be
    // throttled or the poller would burn its attempt budget on 429s
    let generation = if config.server.api.rate_limit.enabled {
        let limiter = Arc::new(rate_limit::RateLimiter::new(
            config.server.api.rate_limit.clone(),
        ));
        limiter.spawn_pruning(
            config.tasks.sweep_interval,
            state.hub.shutdown_token().child_token(),
        );
        generation.route_layer(middleware::from_fn_with_state(
            limiter,
            rate_limit::rate_limit_middleware,
        ))
    } else {
        generation
    };

    let router = Router::new()
        .route("/check-content-status", get(routes::check_content_status))
        .route("/health", get(routes::health_check))
        .route("/openapi.json", get(routes::openapi_spec))
        .route("/events", get(routes::event_stream))
        .merge(generation);

    // Merge Swagger UI routes if enabled in config (before applying state).
    // SwaggerUi serves its own copy of the document, which must not collide
    // with the /openapi.json route above
    let router = if config.server.api.swagger_ui {
        router.merge(
            SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()),
        )
    } else {
        router
    };

    let router = router
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if config.server.api.cors_enabled {
        let cors = build_cors_layer(&config.server.api.cors_origins);
        router.layer(cors)
    } else {
        router
    }
}

/// Build a CORS layer based on configured origins
///
/// "*" (or an empty list) allows any origin; otherwise only the listed
/// origins are allowed. Methods and headers are always unrestricted.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_any = origins.iter().any(|o| o == "*");

    if allow_any || origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Start the API server on the configured bind address.
///
/// Runs until the hub shuts down (its shutdown token is cancelled) or the
/// server fails.
///
/// # Example
///
/// ```no_run
/// use study_pathways::{Config, StudyHub};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Arc::new(Config::default());
/// let hub = Arc::new(StudyHub::new((*config).clone()).await?);
///
/// // Start API server (blocks until shutdown)
/// study_pathways::api::start_api_server(hub, config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_api_server(hub: Arc<StudyHub>, config: Arc<Config>) -> Result<()> {
    let bind_address = config.server.api.bind_address;

    tracing::info!(
        address = %bind_address,
        "Starting API server"
    );

    let listener = TcpListener::bind(bind_address)
        .await
        .map_err(crate::error::Error::Io)?;

    let shutdown = hub.shutdown_token();
    serve(listener, hub, config, shutdown).await
}

/// Serve the API on an already-bound listener until `shutdown` is cancelled
///
/// Binding to port 0 and reading `listener.local_addr()` beforehand gives an
/// ephemeral port.
pub async fn serve(
    listener: TcpListener,
    hub: Arc<StudyHub>,
    config: Arc<Config>,
    shutdown: CancellationToken,
) -> Result<()> {
    let local_addr = listener.local_addr().map_err(crate::error::Error::Io)?;
    let app = create_router(hub, config);

    tracing::info!(
        address = %local_addr,
        "API server listening"
    );

    // into_make_service_with_connect_info provides ConnectInfo<SocketAddr>
    // for the rate limiting middleware
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move { shutdown.cancelled().await })
    .await
    .map_err(|e| crate::error::Error::ApiServerError(e.to_string()))?;

    tracing::info!("API server stopped");
    Ok(())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

//! Study hub HTTP server
//!
//! Loads `.env`, builds the configuration from the environment, and serves
//! the REST API until SIGTERM or Ctrl+C.
//!
//! After starting, you can:
//! - View Swagger UI at http://localhost:3000/swagger-ui
//! - Start generation via GET http://localhost:3000/initiate-content-generation
//! - Stream events via GET http://localhost:3000/events

use std::sync::Arc;
use study_pathways::{Config, StudyHub};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,study_pathways=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    let config = Config::from_env()?;
    if config.providers.api_key.is_none() {
        tracing::warn!("GOOGLE_API_KEY is not set; content generation will fail");
    }

    let hub = Arc::new(StudyHub::new(config).await?);
    let server = hub.spawn_api_server();

    tokio::select! {
        result = server => {
            // The server only returns on its own if it failed to start or crashed
            match result {
                Ok(Ok(())) => tracing::info!("API server exited"),
                Ok(Err(e)) => tracing::error!(error = %e, "API server failed"),
                Err(e) => tracing::error!(error = %e, "API server task panicked"),
            }
            hub.shutdown().await?;
        }
        result = study_pathways::run_with_shutdown(hub.clone()) => {
            result?;
        }
    }

    Ok(())
}

//! # study-pathways
//!
//! Study pathway generator and educational content aggregator.
//!
//! Given a topic and an academic level, the service asks a generative text
//! model for a multi-stage study pathway, then serves supplementary content
//! for each stage: videos, books, educational websites, AI notes and AI
//! practice questions. Slow content is generated on background tasks that
//! clients poll, so no request has to stay open while a provider answers.
//!
//! ## Quick Start
//!
//! ```no_run
//! use study_pathways::{Config, StudyHub};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let hub = Arc::new(StudyHub::new(config).await?);
//!
//!     // Subscribe to events
//!     let mut events = hub.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     hub.spawn_api_server();
//!     study_pathways::run_with_shutdown(hub).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Polling a task
//!
//! ```no_run
//! use study_pathways::client::ContentClient;
//! use study_pathways::types::ContentRequest;
//! use study_pathways::Config;
//!
//! # async fn example() -> study_pathways::Result<()> {
//! let client = ContentClient::new("http://127.0.0.1:3000", &Config::default())?;
//! let request = ContentRequest::from_params(
//!     Some("Photosynthesis"),
//!     Some("Middle School"),
//!     Some("ai-questions"),
//!     Some("Stage 1: Basics"),
//! )?;
//! let html = client.fetch_content(&request).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API module
pub mod api;
/// HTTP client and task poller
pub mod client;
/// Configuration types
pub mod config;
/// Per-kind content rendering
pub mod content;
/// Document topic inference
pub mod documents;
/// Error types
pub mod error;
/// Service wiring (decomposed into focused submodules)
pub mod hub;
/// Background content generation tasks
pub mod orchestrator;
/// Study pathway generation
pub mod pathway;
/// External content providers
pub mod providers;
/// Retry logic with backoff
pub mod retry;
/// Time-bounded key-value stores
pub mod store;
/// Core types and events
pub mod types;

// Re-export commonly used types
pub use client::{ContentClient, PollHandle, PollState};
pub use config::Config;
pub use error::{ApiError, Error, ErrorDetail, ProviderError, Result, ToHttpStatus};
pub use hub::StudyHub;
pub use types::{
    ContentKind, ContentRequest, DocumentInsights, Event, TaskId, TaskOutcome, TaskState,
    TaskStatusResponse,
};

use std::sync::Arc;

/// Helper function to run the hub with graceful signal handling.
///
/// Waits for a termination signal and then calls the hub's `shutdown()`
/// method, which also stops an API server started with
/// [`StudyHub::spawn_api_server`].
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
pub async fn run_with_shutdown(hub: Arc<StudyHub>) -> Result<()> {
    wait_for_signal().await;
    hub.shutdown().await
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Set up signal handlers - these may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            if let Ok(mut sigint) = signal(SignalKind::interrupt()) {
                sigint.recv().await;
                tracing::info!("Received SIGINT signal (Ctrl+C)");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
        (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
                sigterm.recv().await;
                tracing::info!("Received SIGTERM signal");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}

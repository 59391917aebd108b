//! Route handlers for the REST API
//!
//! Handlers are organized by domain:
//! - [`content`]: task initiation, status polling and synchronous generation
//! - [`pathway`]: study pathway generation
//! - [`documents`]: PDF upload and topic inference
//! - [`system`]: health, events, OpenAPI

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

mod content;
mod documents;
mod pathway;
mod system;

pub use content::*;
pub use documents::*;
pub use pathway::*;
pub use system::*;

// ============================================================================
// Query/Response Types (shared across handlers)
// ============================================================================

/// Query parameters for content generation
///
/// Every field is optional at the extractor level so that missing values are
/// reported together as a single `invalid_request` error.
#[derive(Debug, Default, Deserialize, Serialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ContentQuery {
    /// Study topic, e.g. "Photosynthesis"
    pub topic: Option<String>,
    /// Academic level, e.g. "Middle School"
    pub grade: Option<String>,
    /// Content kind: video, books, websites, ai-notes or ai-questions
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Pathway stage heading, e.g. "Stage 1: Basics"
    pub stage: Option<String>,
}

/// Query parameters for GET /check-content-status
#[derive(Debug, Default, Deserialize, Serialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StatusQuery {
    /// Task identifier returned by initiation
    #[serde(rename = "taskId")]
    pub task_id: Option<String>,
}

/// Query parameters for GET /study-pathway
#[derive(Debug, Default, Deserialize, Serialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PathwayQuery {
    /// Study topic
    pub topic: Option<String>,
    /// Academic level
    pub grade: Option<String>,
}

/// Response body of GET /health
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Always "ok" while the server is answering
    pub status: String,
    /// Crate version
    pub version: String,
    /// Content generations still running
    pub in_flight_tasks: usize,
    /// Whether POST /upload-pdf is available
    pub document_upload: bool,
}

//! Application state for the API server

use crate::{Config, StudyHub};
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// Cloned for each request (cheap Arc clone).
#[derive(Clone)]
pub struct AppState {
    /// The hub serving content, pathways and document insights
    pub hub: Arc<StudyHub>,

    /// Configuration (read-only)
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(hub: Arc<StudyHub>, config: Arc<Config>) -> Self {
        Self { hub, config }
    }
}

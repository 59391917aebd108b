//! Service wiring split into focused submodules.
//!
//! The `StudyHub` struct owns every service and is what the HTTP layer and
//! embedding applications talk to:
//! - [`lifecycle`] - Graceful shutdown
//! - [`services`] - Background store eviction

mod lifecycle;
mod services;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;

use crate::config::Config;
use crate::content::ContentService;
use crate::documents::DocumentInsightService;
use crate::error::Result;
use crate::orchestrator::TaskOrchestrator;
use crate::pathway::{Pathway, PathwayService};
use crate::providers::{self, DocumentAnalyzer, Providers};
use crate::store::{KeyValueStore, MemoryStore};
use crate::types::{ContentRequest, DocumentInsights, Event, TaskId, TaskState};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

/// Educational content service
///
/// Holds the task orchestrator, the pathway and document services, both
/// key-value stores and the event channel.
pub struct StudyHub {
    config: Arc<Config>,
    orchestrator: TaskOrchestrator,
    pathways: PathwayService,
    documents: DocumentInsightService,
    task_store: Arc<dyn KeyValueStore<TaskState>>,
    pathway_cache: Arc<dyn KeyValueStore<String>>,
    event_tx: broadcast::Sender<Event>,
    cancel_token: CancellationToken,
}

impl StudyHub {
    /// Create a hub with HTTP-backed providers built from `config`
    ///
    /// Must be called from within a tokio runtime; background eviction
    /// starts immediately.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::error::Error::Config) if the
    /// configuration is invalid, or a network error if an HTTP client cannot
    /// be built.
    pub async fn new(config: Config) -> Result<Self> {
        let providers = Providers::from_config(&config.providers)?;
        let analyzer = providers::document_analyzer_from_config(&config.providers)?;
        Self::with_providers(config, providers, analyzer).await
    }

    /// Create a hub over caller-supplied providers
    pub async fn with_providers(
        config: Config,
        providers: Providers,
        analyzer: Option<Arc<dyn DocumentAnalyzer>>,
    ) -> Result<Self> {
        config.validate()?;

        let (event_tx, _rx) = broadcast::channel(1000);
        let task_store: Arc<dyn KeyValueStore<TaskState>> = Arc::new(MemoryStore::new(
            Some(config.tasks.ttl),
            config.tasks.max_entries,
        ));
        let pathway_cache: Arc<dyn KeyValueStore<String>> =
            Arc::new(MemoryStore::new(Some(config.pathway.cache_ttl), None));

        let orchestrator = TaskOrchestrator::new(
            task_store.clone(),
            ContentService::new(providers.clone()),
            config.tasks.clone(),
            event_tx.clone(),
        );
        let pathways = PathwayService::new(
            providers.text.clone(),
            pathway_cache.clone(),
            config.pathway.clone(),
        );
        let documents =
            DocumentInsightService::new(analyzer, providers.text.clone(), config.upload.clone());

        let hub = Self {
            config: Arc::new(config),
            orchestrator,
            pathways,
            documents,
            task_store,
            pathway_cache,
            event_tx,
            cancel_token: CancellationToken::new(),
        };
        hub.start_eviction_tasks();

        tracing::info!(
            task_ttl_secs = hub.config.tasks.ttl.as_secs(),
            document_upload = hub.documents.is_enabled(),
            "study hub started"
        );
        Ok(hub)
    }

    /// Start generating content for `request`; returns the task id at once
    pub async fn initiate(&self, request: ContentRequest) -> Result<TaskId> {
        self.orchestrator.initiate(request).await
    }

    /// Current state of a task
    pub async fn status(&self, task_id: &TaskId) -> Result<TaskState> {
        self.orchestrator.status(task_id).await
    }

    /// Generate content for `request` and wait for it
    pub async fn generate_content(&self, request: &ContentRequest) -> Result<String> {
        self.orchestrator.generate_now(request).await
    }

    /// Study pathway for `topic`/`grade`
    pub async fn pathway(&self, topic: Option<&str>, grade: Option<&str>) -> Result<Pathway> {
        let pathway = self.pathways.pathway(topic, grade).await?;
        let _ = self.event_tx.send(Event::PathwayGenerated {
            topic: topic.unwrap_or_default().trim().to_string(),
            grade: grade.unwrap_or_default().trim().to_string(),
            cached: pathway.cached,
        });
        Ok(pathway)
    }

    /// Infer topic and level from an uploaded document
    pub async fn analyze_document(
        &self,
        document: &[u8],
        file_name: Option<&str>,
    ) -> Result<DocumentInsights> {
        self.documents.analyze(document, file_name).await
    }

    /// Whether document uploads can be analyzed
    pub fn document_upload_enabled(&self) -> bool {
        self.documents.is_enabled()
    }

    /// Number of content generations still running
    pub fn in_flight_tasks(&self) -> usize {
        self.orchestrator.in_flight()
    }

    /// Subscribe to task and pathway events
    ///
    /// Slow subscribers miss events rather than blocking producers (see
    /// [`broadcast::error::RecvError::Lagged`]).
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Get the current configuration
    pub fn get_config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    /// Spawn the REST API server in a background task
    pub fn spawn_api_server(self: &Arc<Self>) -> tokio::task::JoinHandle<Result<()>> {
        let hub = self.clone();
        let config = self.config.clone();

        tokio::spawn(async move { crate::api::start_api_server(hub, config).await })
    }

    /// Token cancelled when the hub shuts down
    pub fn shutdown_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }
}

//! HTTP client for the study-pathways API
//!
//! [`ContentClient`] wraps the three public routes: it initiates content
//! generation, polls the task until it resolves (see [`poller`]), and fetches
//! study pathways with a fixed retry.

pub mod poller;

pub use poller::{PollHandle, PollState};

use crate::config::{Config, PollerConfig, RetryConfig};
use crate::content::render::STAGE_ERROR_MARKER;
use crate::error::{ApiError, Error, Result};
use crate::retry::with_retry;
use crate::types::{ContentRequest, InitiateResponse, TaskId, TaskStatusResponse};
use std::time::Duration;
use url::Url;

/// Per-request timeout for every client call
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Marker text of a whole-pathway error page
///
/// Current servers answer a total failure with 502; older deployments
/// returned this page with 200 instead.
pub const ERROR_PATHWAY_MARKER: &str = "Error generating study pathway";

/// Client for a running study hub
#[derive(Clone, Debug)]
pub struct ContentClient {
    http: reqwest::Client,
    base_url: Url,
    poller: PollerConfig,
    retry: RetryConfig,
}

impl ContentClient {
    /// Create a client using the poller and retry settings from `config`
    pub fn new(base_url: &str, config: &Config) -> Result<Self> {
        Self::with_settings(base_url, config.poller.clone(), config.retry.clone())
    }

    /// Create a client with explicit poller and retry settings
    pub fn with_settings(base_url: &str, poller: PollerConfig, retry: RetryConfig) -> Result<Self> {
        let mut base_url = Url::parse(base_url).map_err(|e| Error::Config {
            message: format!("invalid base URL {base_url:?}: {e}"),
            key: Some("client.base_url".into()),
        })?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            http,
            base_url,
            poller,
            retry,
        })
    }

    /// Polling settings used by [`poll`](Self::poll)
    pub fn poller_config(&self) -> &PollerConfig {
        &self.poller
    }

    fn endpoint(&self, route: &str) -> Result<Url> {
        self.base_url
            .join(route)
            .map_err(|e| Error::Other(format!("failed to build URL for {route}: {e}")))
    }

    /// Start generating content; returns the task id to poll
    pub async fn initiate(&self, request: &ContentRequest) -> Result<TaskId> {
        let response = self
            .http
            .get(self.endpoint("initiate-content-generation")?)
            .query(&[
                ("topic", request.topic.as_str()),
                ("grade", request.grade.as_str()),
                ("type", request.kind.as_str()),
                ("stage", request.stage.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let body: InitiateResponse = response.json().await?;
        tracing::debug!(task_id = %body.task_id, kind = %request.kind, "content generation initiated");
        Ok(body.task_id)
    }

    /// Query the status of a task once
    pub async fn check_status(&self, task_id: &TaskId) -> Result<TaskStatusResponse> {
        let response = self
            .http
            .get(self.endpoint("check-content-status")?)
            .query(&[("taskId", task_id.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        Ok(response.json().await?)
    }

    /// Initiate generation and poll until the content is ready
    pub async fn fetch_content(&self, request: &ContentRequest) -> Result<String> {
        let task_id = self.initiate(request).await?;
        let (state, _rx) = tokio::sync::watch::channel(PollState::Idle);
        self.poll(&task_id, &tokio_util::sync::CancellationToken::new(), &state)
            .await
    }

    /// Fetch the study pathway for `topic`/`grade`
    ///
    /// Transient failures and error pages (see [`is_error_pathway`]) are
    /// retried according to the retry settings. Partial pathways are never
    /// cached by the server, so a retry regenerates the failed stages.
    pub async fn fetch_pathway(&self, topic: &str, grade: &str) -> Result<String> {
        let url = self.endpoint("study-pathway")?;

        with_retry(&self.retry, || {
            let url = url.clone();
            async move {
                let response = self
                    .http
                    .get(url)
                    .query(&[("topic", topic), ("grade", grade)])
                    .send()
                    .await?;

                if !response.status().is_success() {
                    return Err(error_from_response(response).await);
                }

                let html = response.text().await?;
                if is_error_pathway(&html) {
                    return Err(Error::Http {
                        status: 502,
                        message: "server returned an error pathway".into(),
                    });
                }
                Ok(html)
            }
        })
        .await
    }
}

/// Whether a pathway page is an error page or has a failed stage
pub fn is_error_pathway(html: &str) -> bool {
    html.contains(ERROR_PATHWAY_MARKER) || html.contains(STAGE_ERROR_MARKER)
}

/// Turn a non-success response into an [`Error`]
///
/// 400 and 404 keep their meaning; everything else becomes [`Error::Http`].
async fn error_from_response(response: reqwest::Response) -> Error {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiError>(&body)
        .map(|api| api.error.message)
        .unwrap_or(body);

    match status {
        400 => Error::InvalidRequest(message),
        404 => Error::NotFound(message),
        status => Error::Http { status, message },
    }
}

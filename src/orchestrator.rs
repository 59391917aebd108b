//! Asynchronous content-generation tasks
//!
//! [`TaskOrchestrator::initiate`] records a task as pending, schedules the
//! generation on the runtime and returns the task id immediately. The
//! background routine writes exactly one terminal state back into the task
//! store; status queries are plain reads of that store.
//!
//! Generation is tracked by a [`TaskTracker`] so shutdown can stop accepting
//! work and wait, bounded, for in-flight tasks.

use crate::config::TaskConfig;
use crate::content::{ContentService, render};
use crate::error::{Error, ProviderError, Result, ToHttpStatus};
use crate::store::KeyValueStore;
use crate::types::{ContentRequest, Event, TaskFailure, TaskId, TaskOutcome, TaskState};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use tokio::sync::broadcast;
use tokio_util::task::TaskTracker;

/// Creates tasks, runs their generation in the background, and answers
/// status queries
pub struct TaskOrchestrator {
    store: Arc<dyn KeyValueStore<TaskState>>,
    content: ContentService,
    config: TaskConfig,
    event_tx: broadcast::Sender<Event>,
    tracker: TaskTracker,
    accepting_new: AtomicBool,
    /// Millisecond timestamp of the most recently issued id
    last_id_millis: AtomicI64,
}

impl TaskOrchestrator {
    /// Create an orchestrator writing task state into `store`
    pub fn new(
        store: Arc<dyn KeyValueStore<TaskState>>,
        content: ContentService,
        config: TaskConfig,
        event_tx: broadcast::Sender<Event>,
    ) -> Self {
        Self {
            store,
            content,
            config,
            event_tx,
            tracker: TaskTracker::new(),
            accepting_new: AtomicBool::new(true),
            last_id_millis: AtomicI64::new(0),
        }
    }

    /// Issue a fresh id for `request`'s content kind
    ///
    /// Ids are `<kind>_<millis>` with the millisecond part strictly
    /// increasing, so two tasks created in the same millisecond still get
    /// distinct ids.
    fn next_task_id(&self, request: &ContentRequest) -> TaskId {
        let now = chrono::Utc::now().timestamp_millis();
        let previous = match self.last_id_millis.fetch_update(
            Ordering::SeqCst,
            Ordering::SeqCst,
            |last| Some(now.max(last + 1)),
        ) {
            Ok(previous) | Err(previous) => previous,
        };
        let millis = now.max(previous + 1);
        TaskId(format!("{}_{millis}", request.kind))
    }

    /// Create a pending task for `request` and start generating it
    ///
    /// Returns as soon as the pending state is stored; the caller never
    /// waits for the provider.
    ///
    /// # Errors
    ///
    /// [`Error::ShuttingDown`] after [`shutdown`](Self::shutdown) began, or a
    /// store error (e.g. [`Error::StoreFull`]) if the task could not be
    /// recorded. No background work is started in either case.
    pub async fn initiate(&self, request: ContentRequest) -> Result<TaskId> {
        if !self.accepting_new.load(Ordering::SeqCst) {
            return Err(Error::ShuttingDown);
        }

        let task_id = self.next_task_id(&request);
        self.store
            .create(task_id.as_str(), TaskState::Pending, self.config.ttl)
            .await?;

        tracing::info!(
            task_id = %task_id,
            kind = %request.kind,
            topic = %request.topic,
            "content generation task created"
        );
        let _ = self.event_tx.send(Event::TaskCreated {
            task_id: task_id.clone(),
            kind: request.kind.to_string(),
        });

        let store = Arc::clone(&self.store);
        let content = self.content.clone();
        let event_tx = self.event_tx.clone();
        let ttl = self.config.ttl;
        let generation_timeout = self.config.generation_timeout;
        let id = task_id.clone();

        self.tracker.spawn(async move {
            let result = match generation_timeout {
                Some(limit) => tokio::time::timeout(limit, content.generate(&request))
                    .await
                    .unwrap_or_else(|_| {
                        Err(ProviderError::Timeout {
                            provider: "content",
                            seconds: limit.as_secs(),
                        }
                        .into())
                    }),
                None => content.generate(&request).await,
            };

            let (outcome, event) = match result {
                Ok(html) => {
                    tracing::info!(task_id = %id, "content generation completed");
                    (
                        TaskOutcome::Ready { content: html },
                        Event::TaskCompleted {
                            task_id: id.clone(),
                        },
                    )
                }
                Err(e) => {
                    tracing::warn!(task_id = %id, error = %e, "content generation failed");
                    let failure = TaskFailure {
                        code: e.error_code().to_string(),
                        message: e.to_string(),
                    };
                    (
                        TaskOutcome::Failed {
                            content: render::apology(&request.kind),
                            error: failure.clone(),
                        },
                        Event::TaskFailed {
                            task_id: id.clone(),
                            code: failure.code,
                            message: failure.message,
                        },
                    )
                }
            };

            // terminal write refreshes the TTL; a task that already expired stays gone
            match store
                .replace(id.as_str(), TaskState::Completed { outcome }, Some(ttl))
                .await
            {
                Ok(true) => {
                    let _ = event_tx.send(event);
                }
                Ok(false) => {
                    tracing::warn!(
                        task_id = %id,
                        "task expired before generation finished, dropping result"
                    );
                }
                Err(e) => {
                    tracing::error!(task_id = %id, error = %e, "failed to store task result");
                }
            }
        });

        Ok(task_id)
    }

    /// Current state of a task
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if the task never existed or has expired.
    pub async fn status(&self, task_id: &TaskId) -> Result<TaskState> {
        self.store
            .get(task_id.as_str())
            .await?
            .ok_or_else(|| Error::NotFound(format!("task {task_id} not found or expired")))
    }

    /// Generate content for `request` without creating a task
    pub async fn generate_now(&self, request: &ContentRequest) -> Result<String> {
        if !self.accepting_new.load(Ordering::SeqCst) {
            return Err(Error::ShuttingDown);
        }
        self.content.generate(request).await
    }

    /// Number of generations still running
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Stop accepting tasks and wait (up to the drain timeout) for running
    /// generations
    ///
    /// Returns `true` if every generation finished in time.
    pub async fn shutdown(&self) -> bool {
        self.accepting_new.store(false, Ordering::SeqCst);
        self.tracker.close();

        let in_flight = self.tracker.len();
        if in_flight > 0 {
            tracing::info!(in_flight, "waiting for in-flight content generation");
        }

        match tokio::time::timeout(self.config.drain_timeout, self.tracker.wait()).await {
            Ok(()) => true,
            Err(_) => {
                tracing::warn!(
                    remaining = self.tracker.len(),
                    "timed out waiting for content generation, abandoning remaining tasks"
                );
                false
            }
        }
    }
}

//! Task status poller
//!
//! Checks a task once per interval until it resolves, fails, is cancelled or
//! runs out of attempts. The current [`PollState`] is published on a `watch`
//! channel so a UI can drive its loading indicator from it.

use super::ContentClient;
use crate::error::{Error, Result, ToHttpStatus};
use crate::retry::IsRetryable;
use crate::types::{TaskId, TaskStatusResponse};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Observable state of a poll
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PollState {
    /// Not started yet
    Idle,
    /// Waiting for the given (1-based) status check
    Polling {
        /// Status check in progress
        attempt: u32,
    },
    /// The task completed with content
    Resolved {
        /// Rendered HTML fragment
        content: String,
    },
    /// The attempt budget ran out while the task was still pending
    TimedOut {
        /// Number of status checks performed
        attempts: u32,
    },
    /// The task failed or the server rejected the poll
    Errored {
        /// Machine-readable error code
        code: String,
        /// Error message
        message: String,
        /// Apology fragment, when the task itself failed
        content: Option<String>,
    },
    /// The poll was cancelled by its owner
    Cancelled,
}

impl PollState {
    /// Whether a loading indicator should be shown
    pub fn is_loading(&self) -> bool {
        matches!(self, PollState::Polling { .. })
    }

    /// Whether polling has stopped
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PollState::Idle | PollState::Polling { .. })
    }
}

/// Handle to a poll running in the background
pub struct PollHandle {
    state: watch::Receiver<PollState>,
    cancel: CancellationToken,
    task: JoinHandle<Result<String>>,
}

impl PollHandle {
    /// Current state
    pub fn state(&self) -> PollState {
        self.state.borrow().clone()
    }

    /// Receiver for state changes
    pub fn watch(&self) -> watch::Receiver<PollState> {
        self.state.clone()
    }

    /// Stop polling; the poll finishes with [`Error::Cancelled`]
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for the poll to finish
    pub async fn join(self) -> Result<String> {
        self.task
            .await
            .map_err(|e| Error::Other(format!("poll task failed: {e}")))?
    }
}

impl ContentClient {
    /// Poll `task_id` until it leaves the pending state
    ///
    /// Waits one interval before every status check. Network errors and 5xx
    /// answers are logged and polling continues; 400 and 404 end the poll.
    ///
    /// # Errors
    ///
    /// - [`Error::GenerationFailed`] when the task completed with a failure
    /// - [`Error::NotFound`] / [`Error::InvalidRequest`] from the server
    /// - [`Error::Timeout`] when `max_attempts` checks all saw `pending`
    /// - [`Error::Cancelled`] when `cancel` fires
    pub async fn poll(
        &self,
        task_id: &TaskId,
        cancel: &CancellationToken,
        state: &watch::Sender<PollState>,
    ) -> Result<String> {
        let max_attempts = self.poller.max_attempts;

        for attempt in 1..=max_attempts {
            state.send_replace(PollState::Polling { attempt });

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return cancelled(task_id, state),
                _ = tokio::time::sleep(self.poller.interval) => {}
            }

            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => return cancelled(task_id, state),
                result = self.check_status(task_id) => result,
            };

            match result {
                Ok(TaskStatusResponse::Pending) => {
                    tracing::trace!(task_id = %task_id, attempt, "task still pending");
                }
                Ok(TaskStatusResponse::Completed {
                    content,
                    error: None,
                }) => {
                    tracing::debug!(task_id = %task_id, attempt, "task resolved");
                    state.send_replace(PollState::Resolved {
                        content: content.clone(),
                    });
                    return Ok(content);
                }
                Ok(TaskStatusResponse::Completed {
                    content,
                    error: Some(failure),
                }) => {
                    tracing::debug!(task_id = %task_id, code = %failure.code, "task failed");
                    state.send_replace(PollState::Errored {
                        code: failure.code.clone(),
                        message: failure.message.clone(),
                        content: Some(content.clone()),
                    });
                    return Err(Error::GenerationFailed {
                        code: failure.code,
                        message: failure.message,
                        content,
                    });
                }
                Err(e) if e.is_retryable() => {
                    tracing::warn!(task_id = %task_id, attempt, error = %e, "status check failed, will retry");
                }
                Err(e) => {
                    tracing::warn!(task_id = %task_id, attempt, error = %e, "polling stopped");
                    state.send_replace(PollState::Errored {
                        code: e.error_code().to_string(),
                        message: e.to_string(),
                        content: None,
                    });
                    return Err(e);
                }
            }
        }

        tracing::warn!(task_id = %task_id, attempts = max_attempts, "gave up waiting for task");
        state.send_replace(PollState::TimedOut {
            attempts: max_attempts,
        });
        Err(Error::Timeout {
            attempts: max_attempts,
        })
    }

    /// Poll `task_id` on a background task
    pub fn spawn_poll(&self, task_id: TaskId) -> PollHandle {
        let (state_tx, state_rx) = watch::channel(PollState::Idle);
        let cancel = CancellationToken::new();

        let client = self.clone();
        let token = cancel.clone();
        let task = tokio::spawn(async move { client.poll(&task_id, &token, &state_tx).await });

        PollHandle {
            state: state_rx,
            cancel,
            task,
        }
    }
}

fn cancelled(task_id: &TaskId, state: &watch::Sender<PollState>) -> Result<String> {
    tracing::debug!(task_id = %task_id, "polling cancelled");
    state.send_replace(PollState::Cancelled);
    Err(Error::Cancelled)
}

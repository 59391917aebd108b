//! Core types for study-pathways

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Opaque identifier of a content-generation task
///
/// Formed as `<content-kind>_<creation time in milliseconds>`. Callers never
/// construct one for a new task; ids come from the orchestrator.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct TaskId(pub String);

impl TaskId {
    /// Borrow the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for TaskId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind of supplementary content requested for a pathway stage
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ContentKind {
    /// Video search results
    Video,
    /// Book search results
    Books,
    /// Curated educational website links
    Websites,
    /// AI-generated study notes
    AiNotes,
    /// AI-generated practice questions
    AiQuestions,
    /// Anything else; rendered as a "not supported yet" placeholder
    Unsupported(String),
}

impl ContentKind {
    /// Parse a wire value; unknown values become [`ContentKind::Unsupported`]
    pub fn parse(value: &str) -> Self {
        match value {
            "video" => ContentKind::Video,
            "books" => ContentKind::Books,
            "websites" => ContentKind::Websites,
            "ai-notes" => ContentKind::AiNotes,
            "ai-questions" => ContentKind::AiQuestions,
            other => ContentKind::Unsupported(other.to_string()),
        }
    }

    /// Wire value of this kind
    pub fn as_str(&self) -> &str {
        match self {
            ContentKind::Video => "video",
            ContentKind::Books => "books",
            ContentKind::Websites => "websites",
            ContentKind::AiNotes => "ai-notes",
            ContentKind::AiQuestions => "ai-questions",
            ContentKind::Unsupported(other) => other,
        }
    }
}

impl From<String> for ContentKind {
    fn from(value: String) -> Self {
        ContentKind::parse(&value)
    }
}

impl From<ContentKind> for String {
    fn from(kind: ContentKind) -> Self {
        kind.as_str().to_string()
    }
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated request for stage content
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContentRequest {
    /// Study topic, e.g. "Photosynthesis"
    pub topic: String,
    /// Academic level, e.g. "Middle School"
    pub grade: String,
    /// Requested content kind
    pub kind: ContentKind,
    /// Pathway stage heading, e.g. "Stage 1: Basics"
    pub stage: String,
}

impl ContentRequest {
    /// Validate raw (possibly missing) parameters into a request
    ///
    /// Every parameter must be present and non-blank; the error names all
    /// missing parameters at once.
    pub fn from_params(
        topic: Option<&str>,
        grade: Option<&str>,
        kind: Option<&str>,
        stage: Option<&str>,
    ) -> Result<Self> {
        let present = |value: Option<&str>| {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let (topic, grade, kind, stage) =
            (present(topic), present(grade), present(kind), present(stage));

        match (topic, grade, kind, stage) {
            (Some(topic), Some(grade), Some(kind), Some(stage)) => Ok(Self {
                topic,
                grade,
                kind: ContentKind::parse(&kind),
                stage,
            }),
            (topic, grade, kind, stage) => {
                let missing: Vec<&str> = [
                    ("topic", topic.is_none()),
                    ("grade", grade.is_none()),
                    ("type", kind.is_none()),
                    ("stage", stage.is_none()),
                ]
                .into_iter()
                .filter_map(|(name, absent)| absent.then_some(name))
                .collect();
                Err(Error::InvalidRequest(format!(
                    "topic, grade, content type, and stage are required (missing: {})",
                    missing.join(", ")
                )))
            }
        }
    }
}

/// Machine-readable description of a failed generation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TaskFailure {
    /// Error code, e.g. "provider_status"
    pub code: String,
    /// Human-readable error message
    pub message: String,
}

/// Terminal result of a task
///
/// Both variants carry displayable HTML; a failed task stores the apology
/// fragment shown in place of the content.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TaskOutcome {
    /// Generation succeeded
    Ready {
        /// Rendered HTML fragment
        content: String,
    },
    /// Generation failed
    Failed {
        /// Apology HTML fragment
        content: String,
        /// What went wrong
        error: TaskFailure,
    },
}

impl TaskOutcome {
    /// HTML to display for this outcome
    pub fn content(&self) -> &str {
        match self {
            TaskOutcome::Ready { content } | TaskOutcome::Failed { content, .. } => content,
        }
    }

    /// Whether generation succeeded
    pub fn is_ready(&self) -> bool {
        matches!(self, TaskOutcome::Ready { .. })
    }
}

/// State of a task as held in the task store
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TaskState {
    /// Generation has not finished yet
    Pending,
    /// Generation finished (successfully or not)
    Completed {
        /// The terminal outcome
        outcome: TaskOutcome,
    },
}

/// Response body of `GET /initiate-content-generation`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct InitiateResponse {
    /// Identifier to poll with
    #[serde(rename = "taskId")]
    pub task_id: TaskId,
}

/// Response body of `GET /check-content-status`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum TaskStatusResponse {
    /// Still generating
    Pending,
    /// Finished; `error` is present when generation failed
    Completed {
        /// HTML fragment (content or apology)
        content: String,
        /// Failure details, absent on success
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<TaskFailure>,
    },
}

impl From<TaskState> for TaskStatusResponse {
    fn from(state: TaskState) -> Self {
        match state {
            TaskState::Pending => TaskStatusResponse::Pending,
            TaskState::Completed {
                outcome: TaskOutcome::Ready { content },
            } => TaskStatusResponse::Completed {
                content,
                error: None,
            },
            TaskState::Completed {
                outcome: TaskOutcome::Failed { content, error },
            } => TaskStatusResponse::Completed {
                content,
                error: Some(error),
            },
        }
    }
}

/// Topic and level inferred from an uploaded document
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentInsights {
    /// Detected topic
    pub topic: String,
    /// Detected academic level
    pub grade: String,
    /// Subtopics covered by the document
    #[serde(default)]
    pub subtopics: Vec<String>,
    /// Main concepts covered by the document
    #[serde(default)]
    pub main_concepts: Vec<String>,
    /// Beginning of the extracted text
    #[serde(default)]
    pub text_preview: String,
    /// Page count reported by the document analyzer
    #[serde(default)]
    pub num_pages: Option<u32>,
}

/// Event emitted during task and pathway lifecycles
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A task was created and its generation scheduled
    TaskCreated {
        /// Task ID
        task_id: TaskId,
        /// Requested content kind
        kind: String,
    },

    /// A task finished successfully
    TaskCompleted {
        /// Task ID
        task_id: TaskId,
    },

    /// A task finished with a failure outcome
    TaskFailed {
        /// Task ID
        task_id: TaskId,
        /// Machine-readable error code
        code: String,
        /// Error message
        message: String,
    },

    /// Expired task entries were evicted by the background sweep
    TasksEvicted {
        /// Number of entries removed
        count: usize,
    },

    /// A study pathway was served
    PathwayGenerated {
        /// Topic
        topic: String,
        /// Grade
        grade: String,
        /// Whether the pathway came from the cache
        cached: bool,
    },

    /// The service is shutting down
    Shutdown,
}

impl Event {
    /// SSE event name for this event
    pub fn name(&self) -> &'static str {
        match self {
            Event::TaskCreated { .. } => "task_created",
            Event::TaskCompleted { .. } => "task_completed",
            Event::TaskFailed { .. } => "task_failed",
            Event::TasksEvicted { .. } => "tasks_evicted",
            Event::PathwayGenerated { .. } => "pathway_generated",
            Event::Shutdown => "shutdown",
        }
    }
}

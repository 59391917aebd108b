//! Error types for study-pathways
//!
//! This module provides error handling for the service and its client:
//! - The crate-wide [`Error`] type and [`Result`] alias
//! - [`ProviderError`] for failures of external content providers
//! - HTTP status code mapping for API integration
//! - Structured error responses with machine-readable error codes

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for study-pathways operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for study-pathways
///
/// Used by the server (orchestrator, routes, services) and by the polling
/// client. Variants carry enough context to build an [`ApiError`].
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "tasks.ttl")
        key: Option<String>,
    },

    /// A request was missing a required parameter or carried an invalid one
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// An external content provider failed
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Task (or other resource) not found or expired
    #[error("not found: {0}")]
    NotFound(String),

    /// The client poller gave up before the task completed
    #[error("content generation timed out after {attempts} status checks")]
    Timeout {
        /// Number of status checks performed
        attempts: u32,
    },

    /// The task completed, but its generation failed
    ///
    /// Returned by the polling client. `content` is the user-facing apology
    /// fragment stored with the task.
    #[error("content generation failed ({code}): {message}")]
    GenerationFailed {
        /// Machine-readable error code recorded by the server
        code: String,
        /// Human-readable error message recorded by the server
        message: String,
        /// HTML fragment to show in place of the content
        content: String,
    },

    /// A remote endpoint answered with an unexpected HTTP status
    #[error("unexpected HTTP status {status}: {message}")]
    Http {
        /// HTTP status code returned by the remote endpoint
        status: u16,
        /// Response body or reason phrase
        message: String,
    },

    /// The operation was cancelled by its caller
    #[error("operation cancelled")]
    Cancelled,

    /// The task store has no room for another entry
    #[error("task store is full ({capacity} entries)")]
    StoreFull {
        /// Configured maximum number of entries
        capacity: usize,
    },

    /// Shutdown in progress - not accepting new tasks
    #[error("shutdown in progress: not accepting new tasks")]
    ShuttingDown,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),

    /// Operation not supported (collaborator not configured, etc.)
    #[error("not supported: {0}")]
    NotSupported(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Errors raised by external content providers
///
/// Every adapter (text generation, video search, book search, document
/// analysis) reports its failures through this type. The `provider` field
/// names the adapter, e.g. `"gemini"` or `"youtube"`.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// Provider answered with a non-success HTTP status
    #[error("{provider} returned status {status}: {message}")]
    Status {
        /// Provider name
        provider: &'static str,
        /// HTTP status returned by the provider
        status: u16,
        /// Response body or reason phrase
        message: String,
    },

    /// Provider could not be reached
    #[error("{provider} request failed: {message}")]
    Transport {
        /// Provider name
        provider: &'static str,
        /// Underlying transport error
        message: String,
    },

    /// Provider answered with a body we could not interpret
    #[error("{provider} returned an invalid response: {message}")]
    InvalidResponse {
        /// Provider name
        provider: &'static str,
        /// What was wrong with the response
        message: String,
    },

    /// Provider answered successfully but with no usable content
    #[error("{provider} returned an empty response")]
    EmptyResponse {
        /// Provider name
        provider: &'static str,
    },

    /// The uploaded document contained no extractable text
    #[error("no extractable text found in document")]
    NoExtractableText,

    /// Provider call exceeded the configured generation timeout
    #[error("{provider} did not respond within {seconds}s")]
    Timeout {
        /// Provider name
        provider: &'static str,
        /// Timeout that elapsed, in seconds
        seconds: u64,
    },

    /// Provider has no credentials or endpoint configured
    #[error("{provider} is not configured")]
    NotConfigured {
        /// Provider name
        provider: &'static str,
    },
}

impl ProviderError {
    /// Machine-readable code for this failure
    pub fn code(&self) -> &'static str {
        match self {
            ProviderError::Status { .. } => "provider_status",
            ProviderError::Transport { .. } => "provider_unreachable",
            ProviderError::InvalidResponse { .. } => "provider_invalid_response",
            ProviderError::EmptyResponse { .. } => "provider_empty_response",
            ProviderError::NoExtractableText => "no_extractable_text",
            ProviderError::Timeout { .. } => "provider_timeout",
            ProviderError::NotConfigured { .. } => "provider_not_configured",
        }
    }

    /// Name of the provider that failed, if known
    pub fn provider(&self) -> Option<&'static str> {
        match self {
            ProviderError::Status { provider, .. }
            | ProviderError::Transport { provider, .. }
            | ProviderError::InvalidResponse { provider, .. }
            | ProviderError::EmptyResponse { provider }
            | ProviderError::Timeout { provider, .. }
            | ProviderError::NotConfigured { provider } => Some(provider),
            ProviderError::NoExtractableText => None,
        }
    }

    /// Build a transport or status error from a reqwest failure
    pub fn from_reqwest(provider: &'static str, error: reqwest::Error) -> Self {
        match error.status() {
            Some(status) => ProviderError::Status {
                provider,
                status: status.as_u16(),
                message: error.to_string(),
            },
            None if error.is_decode() => ProviderError::InvalidResponse {
                provider,
                message: error.to_string(),
            },
            None => ProviderError::Transport {
                provider,
                message: error.to_string(),
            },
        }
    }
}

/// API error response format
///
/// This structure is returned by API endpoints when an error occurs.
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": {
///     "code": "not_found",
///     "message": "not found: task ai-notes_1700000000000"
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// The error details
    pub error: ErrorDetail,
}

/// Detailed error information for API responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "not_found", "invalid_request")
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional context about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    /// Create a "too many requests" error
    pub fn rate_limited(retry_after_secs: u64) -> Self {
        Self {
            error: ErrorDetail {
                code: "rate_limited".into(),
                message: "too many generation requests, slow down".into(),
                details: Some(serde_json::json!({ "retry_after_seconds": retry_after_secs })),
            },
        }
    }
}

/// Convert errors to HTTP status codes for API responses
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request
            Error::InvalidRequest(_) => 400,

            // 404 Not Found
            Error::NotFound(_) => 404,

            // 422 Unprocessable Entity - the document itself is unusable
            Error::Provider(ProviderError::NoExtractableText) => 422,

            // 502 Bad Gateway - external service errors
            Error::Provider(ProviderError::Timeout { .. }) => 504,
            Error::Provider(ProviderError::NotConfigured { .. }) => 503,
            Error::Provider(_) => 502,
            Error::Network(_) => 502,
            Error::GenerationFailed { .. } => 502,
            Error::Http { .. } => 502,

            // 504 Gateway Timeout
            Error::Timeout { .. } => 504,

            // 503 Service Unavailable
            Error::StoreFull { .. } => 503,
            Error::ShuttingDown => 503,

            // 501 Not Implemented
            Error::NotSupported(_) => 501,

            // 500 Internal Server Error
            Error::Config { .. } => 500,
            Error::Cancelled => 500,
            Error::Io(_) => 500,
            Error::Serialization(_) => 500,
            Error::ApiServerError(_) => 500,
            Error::Other(_) => 500,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::InvalidRequest(_) => "invalid_request",
            Error::Provider(e) => e.code(),
            Error::NotFound(_) => "not_found",
            Error::Timeout { .. } => "timeout",
            Error::GenerationFailed { .. } => "generation_failed",
            Error::Http { .. } => "upstream_status",
            Error::Cancelled => "cancelled",
            Error::StoreFull { .. } => "store_full",
            Error::ShuttingDown => "shutting_down",
            Error::Io(_) => "io_error",
            Error::Network(_) => "network_error",
            Error::Serialization(_) => "serialization_error",
            Error::ApiServerError(_) => "api_server_error",
            Error::NotSupported(_) => "not_supported",
            Error::Other(_) => "internal_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let code = error.error_code().to_string();
        let message = error.to_string();

        let details = match &error {
            Error::Provider(e) => e
                .provider()
                .map(|provider| serde_json::json!({ "provider": provider })),
            Error::Timeout { attempts } => Some(serde_json::json!({ "attempts": attempts })),
            Error::StoreFull { capacity } => Some(serde_json::json!({ "capacity": capacity })),
            Error::Config { key: Some(key), .. } => Some(serde_json::json!({ "key": key })),
            _ => None,
        };

        ApiError {
            error: ErrorDetail {
                code,
                message,
                details,
            },
        }
    }
}

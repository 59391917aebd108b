//! Configuration types for study-pathways

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, time::Duration};
use utoipa::ToSchema;

/// External content provider settings (API key, endpoints, timeouts)
#[derive(Clone, Serialize, Deserialize, ToSchema)]
pub struct ProviderConfig {
    /// Google API key shared by the text model, video search and book search
    #[serde(default)]
    pub api_key: Option<String>,

    /// Generative language API base URL
    #[serde(default = "default_gemini_base_url")]
    pub gemini_base_url: String,

    /// Text generation model name (default: "gemini-1.5-pro")
    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,

    /// Video search API base URL
    #[serde(default = "default_google_apis_base_url")]
    pub youtube_base_url: String,

    /// Book search API base URL
    #[serde(default = "default_google_apis_base_url")]
    pub books_base_url: String,

    /// Per-request timeout for provider HTTP calls (default: 60 seconds)
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub request_timeout: Duration,

    /// Document analyzer endpoint (PDF in, extracted text out); uploads are
    /// rejected with 501 when unset
    #[serde(default)]
    pub document_analyzer_url: Option<String>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("gemini_base_url", &self.gemini_base_url)
            .field("gemini_model", &self.gemini_model)
            .field("youtube_base_url", &self.youtube_base_url)
            .field("books_base_url", &self.books_base_url)
            .field("request_timeout", &self.request_timeout)
            .field("document_analyzer_url", &self.document_analyzer_url)
            .finish()
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            gemini_base_url: default_gemini_base_url(),
            gemini_model: default_gemini_model(),
            youtube_base_url: default_google_apis_base_url(),
            books_base_url: default_google_apis_base_url(),
            request_timeout: default_request_timeout(),
            document_analyzer_url: None,
        }
    }
}

/// Task store and background generation settings
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct TaskConfig {
    /// Lifetime of a task entry, applied at creation and again when the
    /// terminal value is written (default: 300 seconds)
    #[serde(default = "default_task_ttl", with = "duration_serde")]
    pub ttl: Duration,

    /// Maximum number of live task entries (None = unbounded)
    #[serde(default)]
    pub max_entries: Option<usize>,

    /// Interval between sweeps that evict expired entries (default: 30 seconds)
    #[serde(default = "default_sweep_interval", with = "duration_serde")]
    pub sweep_interval: Duration,

    /// Upper bound on a single background generation (None = no limit)
    #[serde(default, with = "optional_duration_serde")]
    pub generation_timeout: Option<Duration>,

    /// How long shutdown waits for in-flight generations (default: 10 seconds)
    #[serde(default = "default_drain_timeout", with = "duration_serde")]
    pub drain_timeout: Duration,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            ttl: default_task_ttl(),
            max_entries: None,
            sweep_interval: default_sweep_interval(),
            generation_timeout: None,
            drain_timeout: default_drain_timeout(),
        }
    }
}

/// Study pathway generation settings
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct PathwayConfig {
    /// Number of stages generated per pathway (default: 3)
    #[serde(default = "default_stage_count")]
    pub stage_count: u32,

    /// How long a complete pathway stays cached (default: 600 seconds)
    #[serde(default = "default_pathway_cache_ttl", with = "duration_serde")]
    pub cache_ttl: Duration,
}

impl Default for PathwayConfig {
    fn default() -> Self {
        Self {
            stage_count: default_stage_count(),
            cache_ttl: default_pathway_cache_ttl(),
        }
    }
}

/// Client-side status polling settings
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct PollerConfig {
    /// Delay before each status check (default: 1000 ms)
    #[serde(default = "default_poll_interval", with = "millis_serde")]
    pub interval: Duration,

    /// Maximum number of status checks before giving up (default: 60)
    #[serde(default = "default_poll_attempts")]
    pub max_attempts: u32,
}

impl PollerConfig {
    /// Total time the poller waits before reporting a timeout
    pub fn budget(&self) -> Duration {
        self.interval.saturating_mul(self.max_attempts)
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: default_poll_interval(),
            max_attempts: default_poll_attempts(),
        }
    }
}

/// Retry configuration for transient client failures
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct RetryConfig {
    /// Maximum number of retries after the first attempt (default: 2)
    #[serde(default = "default_max_retries")]
    pub max_attempts: u32,

    /// Delay before the first retry (default: 2 seconds)
    #[serde(default = "default_initial_delay", with = "duration_serde")]
    pub initial_delay: Duration,

    /// Maximum delay between retries (default: 2 seconds)
    #[serde(default = "default_initial_delay", with = "duration_serde")]
    pub max_delay: Duration,

    /// Multiplier for exponential backoff (default: 1.0, i.e. fixed delay)
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Add random jitter to delays (default: false)
    #[serde(default)]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_retries(),
            initial_delay: default_initial_delay(),
            max_delay: default_initial_delay(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter: false,
        }
    }
}

/// Document upload settings
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadConfig {
    /// Maximum accepted upload size in bytes (default: 10 MiB)
    #[serde(default = "default_max_upload_bytes")]
    pub max_bytes: usize,

    /// Number of characters returned as the text preview (default: 500)
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,

    /// Number of characters of extracted text sent to the model (default: 8000)
    #[serde(default = "default_analysis_chars")]
    pub analysis_chars: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_bytes: default_max_upload_bytes(),
            preview_chars: default_preview_chars(),
            analysis_chars: default_analysis_chars(),
        }
    }
}

/// Main configuration for the study hub
///
/// Fields are organized into sub-configs:
/// - [`providers`](ProviderConfig): API key, provider endpoints
/// - [`tasks`](TaskConfig): task store lifetime and capacity
/// - [`pathway`](PathwayConfig): pathway stages and caching
/// - [`poller`](PollerConfig): client status polling
/// - [`retry`](RetryConfig): client retry for pathway fetches
/// - [`upload`](UploadConfig): document upload limits
/// - [`server`](ServerIntegrationConfig): REST API
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct Config {
    /// Content provider settings
    #[serde(default)]
    pub providers: ProviderConfig,

    /// Task store settings
    #[serde(default)]
    pub tasks: TaskConfig,

    /// Pathway settings
    #[serde(default)]
    pub pathway: PathwayConfig,

    /// Client polling settings
    #[serde(default)]
    pub poller: PollerConfig,

    /// Client retry settings
    #[serde(default)]
    pub retry: RetryConfig,

    /// Document upload settings
    #[serde(default)]
    pub upload: UploadConfig,

    /// API and external server integration
    #[serde(default)]
    pub server: ServerIntegrationConfig,
}

impl Config {
    /// Build a configuration from defaults plus environment variables
    ///
    /// Recognised variables:
    /// - `GOOGLE_API_KEY`: provider API key
    /// - `BIND_ADDRESS`: full socket address, or `PORT`: port on 127.0.0.1
    /// - `DOCUMENT_ANALYZER_URL`: document analyzer endpoint
    pub fn from_env() -> Result<Self> {
        let mut config = Config::default();

        if let Ok(key) = std::env::var("GOOGLE_API_KEY") {
            if !key.trim().is_empty() {
                config.providers.api_key = Some(key);
            }
        }

        if let Ok(addr) = std::env::var("BIND_ADDRESS") {
            config.server.api.bind_address = addr.parse().map_err(|e| Error::Config {
                message: format!("invalid BIND_ADDRESS {addr:?}: {e}"),
                key: Some("server.api.bind_address".into()),
            })?;
        } else if let Ok(port) = std::env::var("PORT") {
            let port: u16 = port.parse().map_err(|e| Error::Config {
                message: format!("invalid PORT {port:?}: {e}"),
                key: Some("server.api.bind_address".into()),
            })?;
            config.server.api.bind_address.set_port(port);
        }

        if let Ok(url) = std::env::var("DOCUMENT_ANALYZER_URL") {
            if !url.trim().is_empty() {
                config.providers.document_analyzer_url = Some(url);
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for values the service cannot run with
    ///
    /// The poller must give up before the task store would evict a slow but
    /// successful task; otherwise clients see a 404 instead of a timeout.
    pub fn validate(&self) -> Result<()> {
        if self.tasks.ttl.is_zero() {
            return Err(Error::Config {
                message: "task TTL must be greater than zero".into(),
                key: Some("tasks.ttl".into()),
            });
        }
        if self.tasks.sweep_interval.is_zero() {
            return Err(Error::Config {
                message: "sweep interval must be greater than zero".into(),
                key: Some("tasks.sweep_interval".into()),
            });
        }
        if self.tasks.max_entries == Some(0) {
            return Err(Error::Config {
                message: "max_entries must be at least 1 when set".into(),
                key: Some("tasks.max_entries".into()),
            });
        }
        if self.poller.max_attempts == 0 || self.poller.interval.is_zero() {
            return Err(Error::Config {
                message: "poller needs a non-zero interval and at least one attempt".into(),
                key: Some("poller".into()),
            });
        }
        if self.poller.budget() >= self.tasks.ttl {
            return Err(Error::Config {
                message: format!(
                    "poller budget ({:?}) must be shorter than the task TTL ({:?})",
                    self.poller.budget(),
                    self.tasks.ttl
                ),
                key: Some("poller.max_attempts".into()),
            });
        }
        if let Some(timeout) = self.tasks.generation_timeout {
            if timeout >= self.tasks.ttl {
                return Err(Error::Config {
                    message: "generation timeout must be shorter than the task TTL".into(),
                    key: Some("tasks.generation_timeout".into()),
                });
            }
        }
        if self.pathway.stage_count == 0 {
            return Err(Error::Config {
                message: "a pathway needs at least one stage".into(),
                key: Some("pathway.stage_count".into()),
            });
        }
        Ok(())
    }
}

/// External access settings
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct ServerIntegrationConfig {
    /// REST API configuration
    #[serde(default)]
    pub api: ApiConfig,
}

/// REST API configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiConfig {
    /// Address to bind to (default: 127.0.0.1:3000)
    #[serde(default = "default_bind_address")]
    pub bind_address: SocketAddr,

    /// Enable CORS for browser access (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins (default: ["*"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Enable Swagger UI at /swagger-ui (default: true)
    #[serde(default = "default_true")]
    pub swagger_ui: bool,

    /// Rate limiting for the generation endpoints
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            cors_enabled: true,
            cors_origins: default_cors_origins(),
            swagger_ui: true,
            rate_limit: RateLimitConfig::default(),
        }
    }
}

/// Rate limiting configuration
///
/// Applies only to routes that reach an external provider (initiate,
/// synchronous generation, pathway, upload). Status polling is never limited.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct RateLimitConfig {
    /// Enable rate limiting (default: false)
    #[serde(default)]
    pub enabled: bool,

    /// Sustained generation requests per minute per IP (default: 30)
    #[serde(default = "default_requests_per_minute")]
    pub requests_per_minute: u32,

    /// Burst size (default: 10)
    #[serde(default = "default_burst_size")]
    pub burst_size: u32,

    /// IPs exempt from rate limiting (e.g., localhost)
    #[serde(default = "default_exempt_ips")]
    pub exempt_ips: Vec<std::net::IpAddr>,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            requests_per_minute: default_requests_per_minute(),
            burst_size: default_burst_size(),
            exempt_ips: default_exempt_ips(),
        }
    }
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_gemini_model() -> String {
    "gemini-1.5-pro".to_string()
}

fn default_google_apis_base_url() -> String {
    "https://www.googleapis.com".to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_task_ttl() -> Duration {
    Duration::from_secs(300)
}

fn default_sweep_interval() -> Duration {
    Duration::from_secs(30)
}

fn default_drain_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_stage_count() -> u32 {
    3
}

fn default_pathway_cache_ttl() -> Duration {
    Duration::from_secs(600)
}

fn default_poll_interval() -> Duration {
    Duration::from_millis(1000)
}

fn default_poll_attempts() -> u32 {
    60
}

fn default_max_retries() -> u32 {
    2
}

fn default_initial_delay() -> Duration {
    Duration::from_secs(2)
}

fn default_backoff_multiplier() -> f64 {
    1.0
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_preview_chars() -> usize {
    500
}

fn default_analysis_chars() -> usize {
    8000
}

fn default_true() -> bool {
    true
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 3000))
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_requests_per_minute() -> u32 {
    30
}

fn default_burst_size() -> u32 {
    10
}

fn default_exempt_ips() -> Vec<std::net::IpAddr> {
    vec![
        std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
        std::net::IpAddr::V6(std::net::Ipv6Addr::LOCALHOST),
    ]
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// Optional Duration serialization helper
mod optional_duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_some(&d.as_secs()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = Option::<u64>::deserialize(deserializer)?;
        Ok(secs.map(Duration::from_secs))
    }
}

// Millisecond Duration serialization helper (poll interval)
mod millis_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

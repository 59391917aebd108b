//! Common test utilities for study-pathways E2E tests
//!
//! [`TestServer`] runs the real API on an ephemeral port, with every external
//! provider (text model, video search, book search, document analyzer)
//! answered by one wiremock server.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;
use study_pathways::api::serve;
use study_pathways::client::ContentClient;
use study_pathways::config::{PollerConfig, RetryConfig};
use study_pathways::{Config, StudyHub};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const GEMINI_PATH: &str = "/v1beta/models/gemini-1.5-pro:generateContent";
pub const YOUTUBE_PATH: &str = "/youtube/v3/search";
pub const BOOKS_PATH: &str = "/books/v1/volumes";
pub const ANALYZER_PATH: &str = "/analyze";

/// A running hub plus the mock server standing in for its providers
pub struct TestServer {
    pub hub: Arc<StudyHub>,
    pub base_url: String,
    pub providers: MockServer,
    server: JoinHandle<study_pathways::Result<()>>,
}

impl TestServer {
    /// Start a hub with default settings
    pub async fn start() -> Self {
        Self::start_with(|_| {}).await
    }

    /// Start a hub after letting `customize` adjust the configuration
    pub async fn start_with(customize: impl FnOnce(&mut Config)) -> Self {
        let providers = MockServer::start().await;

        let mut config = Config::default();
        config.providers.api_key = Some("test-key".to_string());
        config.providers.gemini_base_url = providers.uri();
        config.providers.youtube_base_url = providers.uri();
        config.providers.books_base_url = providers.uri();
        config.providers.document_analyzer_url = Some(format!("{}{ANALYZER_PATH}", providers.uri()));
        config.providers.request_timeout = Duration::from_secs(5);
        customize(&mut config);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let hub = Arc::new(StudyHub::new(config).await.unwrap());
        let server = tokio::spawn(serve(
            listener,
            hub.clone(),
            hub.get_config(),
            hub.shutdown_token(),
        ));

        Self {
            hub,
            base_url,
            providers,
            server,
        }
    }

    /// Client with a fast poller, suitable for tests
    pub fn client(&self) -> ContentClient {
        ContentClient::with_settings(
            &self.base_url,
            PollerConfig {
                interval: Duration::from_millis(20),
                max_attempts: 100,
            },
            RetryConfig {
                initial_delay: Duration::from_millis(20),
                max_delay: Duration::from_millis(20),
                ..RetryConfig::default()
            },
        )
        .unwrap()
    }

    pub fn url(&self, route: &str) -> String {
        format!("{}{route}", self.base_url)
    }

    /// Shut the hub down and wait for the server to stop
    pub async fn stop(self) {
        self.hub.shutdown().await.unwrap();
        tokio::time::timeout(Duration::from_secs(5), self.server)
            .await
            .expect("API server should stop after shutdown")
            .unwrap()
            .unwrap();
    }
}

fn gemini_body(text: &str) -> serde_json::Value {
    serde_json::json!({
        "candidates": [{ "content": { "parts": [{ "text": text }] } }]
    })
}

/// Answer every text-model call with `text`
pub async fn mount_text_model(server: &MockServer, text: &str) {
    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_body(text)))
        .mount(server)
        .await;
}

/// Answer every text-model call with `text` after `delay`
pub async fn mount_slow_text_model(server: &MockServer, text: &str, delay: Duration) {
    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(gemini_body(text))
                .set_delay(delay),
        )
        .mount(server)
        .await;
}

pub async fn mount_failing(server: &MockServer, route: &str, status: u16) {
    Mock::given(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_string("upstream failure"))
        .mount(server)
        .await;
}

/// Answer every video search with the given `(id, title, description)` hits
pub async fn mount_videos(server: &MockServer, videos: &[(&str, &str, &str)]) {
    let items: Vec<serde_json::Value> = videos
        .iter()
        .map(|(id, title, description)| {
            serde_json::json!({
                "id": { "videoId": id },
                "snippet": { "title": title, "description": description }
            })
        })
        .collect();

    Mock::given(method("GET"))
        .and(path(YOUTUBE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "items": items })))
        .mount(server)
        .await;
}

pub async fn mount_analyzer(server: &MockServer, text: &str, num_pages: u32) {
    Mock::given(method("POST"))
        .and(path(ANALYZER_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "text": text, "numPages": num_pages })),
        )
        .mount(server)
        .await;
}

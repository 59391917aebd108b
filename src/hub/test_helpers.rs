//! Shared test helpers: in-process provider stubs and a ready-to-use hub.

use crate::config::Config;
use crate::error::ProviderError;
use crate::hub::StudyHub;
use crate::providers::{
    BookSearch, BookVolume, DocumentAnalyzer, ExtractedDocument, ProviderResult, Providers,
    TextGenerator, VideoSearch, VideoSnippet,
};
use crate::types::ContentRequest;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

type TextFn = dyn Fn(&str) -> ProviderResult<String> + Send + Sync;

/// Scripted [`TextGenerator`] that records every prompt
pub(crate) struct StubText {
    respond: Box<TextFn>,
    prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
    gate: Option<Arc<Semaphore>>,
}

impl StubText {
    pub(crate) fn with_fn(
        respond: impl Fn(&str) -> ProviderResult<String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            respond: Box::new(respond),
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            gate: None,
        }
    }

    pub(crate) fn replying(text: &str) -> Self {
        let text = text.to_string();
        Self::with_fn(move |_| Ok(text.clone()))
    }

    pub(crate) fn failing() -> Self {
        Self::with_fn(|_| {
            Err(ProviderError::Status {
                provider: "gemini",
                status: 500,
                message: "model unavailable".into(),
            })
        })
    }

    /// Hold every call until a permit is added to `gate`
    pub(crate) fn gated(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for StubText {
    async fn generate(&self, prompt: &str) -> ProviderResult<String> {
        if let Some(gate) = &self.gate {
            let _permit = gate.acquire().await.unwrap();
        }
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        (self.respond)(prompt)
    }
}

/// [`VideoSearch`] returning the same hits for every query
pub(crate) struct StubVideos {
    result: ProviderResult<Vec<VideoSnippet>>,
    queries: Mutex<Vec<String>>,
}

impl StubVideos {
    pub(crate) fn replying(videos: Vec<VideoSnippet>) -> Self {
        Self {
            result: Ok(videos),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn empty() -> Self {
        Self::replying(Vec::new())
    }

    pub(crate) fn failing(status: u16) -> Self {
        Self {
            result: Err(ProviderError::Status {
                provider: "youtube",
                status,
                message: "search failed".into(),
            }),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl VideoSearch for StubVideos {
    async fn search(&self, query: &str, _max_results: u32) -> ProviderResult<Vec<VideoSnippet>> {
        self.queries.lock().unwrap().push(query.to_string());
        self.result.clone()
    }
}

/// [`BookSearch`] returning a fixed result
pub(crate) struct StubBooks {
    result: ProviderResult<Vec<BookVolume>>,
}

impl StubBooks {
    pub(crate) fn replying(books: Vec<BookVolume>) -> Self {
        Self { result: Ok(books) }
    }

    pub(crate) fn empty() -> Self {
        Self::replying(Vec::new())
    }

    pub(crate) fn failing(status: u16) -> Self {
        Self {
            result: Err(ProviderError::Status {
                provider: "books",
                status,
                message: "search failed".into(),
            }),
        }
    }
}

#[async_trait]
impl BookSearch for StubBooks {
    async fn search(&self, _query: &str, _max_results: u32) -> ProviderResult<Vec<BookVolume>> {
        self.result.clone()
    }
}

/// [`DocumentAnalyzer`] returning fixed text
pub(crate) struct StubAnalyzer {
    text: String,
    num_pages: Option<u32>,
}

impl StubAnalyzer {
    pub(crate) fn replying(text: &str, num_pages: Option<u32>) -> Self {
        Self {
            text: text.to_string(),
            num_pages,
        }
    }
}

#[async_trait]
impl DocumentAnalyzer for StubAnalyzer {
    async fn analyze(
        &self,
        _document: &[u8],
        _file_name: Option<&str>,
    ) -> ProviderResult<ExtractedDocument> {
        Ok(ExtractedDocument {
            text: self.text.clone(),
            num_pages: self.num_pages,
        })
    }
}

pub(crate) fn providers(
    text: Arc<dyn TextGenerator>,
    videos: Arc<dyn VideoSearch>,
    books: Arc<dyn BookSearch>,
) -> Providers {
    Providers {
        text,
        videos,
        books,
    }
}

/// Providers where the model echoes a fixed fragment and searches find nothing
pub(crate) fn stub_providers() -> Providers {
    providers(
        Arc::new(StubText::replying("<li>generated</li>")),
        Arc::new(StubVideos::empty()),
        Arc::new(StubBooks::empty()),
    )
}

pub(crate) fn request(kind: &str) -> ContentRequest {
    ContentRequest::from_params(
        Some("Photosynthesis"),
        Some("Middle School"),
        Some(kind),
        Some("Stage 1: Basics"),
    )
    .unwrap()
}

/// Hub with default config, stub providers and no document analyzer
pub(crate) async fn create_test_hub() -> Arc<StudyHub> {
    create_test_hub_with(Config::default(), stub_providers(), None).await
}

pub(crate) async fn create_test_hub_with(
    config: Config,
    providers: Providers,
    analyzer: Option<Arc<dyn DocumentAnalyzer>>,
) -> Arc<StudyHub> {
    Arc::new(
        StudyHub::with_providers(config, providers, analyzer)
            .await
            .unwrap(),
    )
}

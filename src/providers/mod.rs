//! External content provider adapters
//!
//! Each external system the service depends on sits behind a small async
//! trait so the orchestrator and tests never see provider specifics:
//! - [`TextGenerator`]: generative text model ([`GeminiClient`])
//! - [`VideoSearch`]: video search ([`YouTubeClient`])
//! - [`BookSearch`]: book search ([`GoogleBooksClient`])
//! - [`DocumentAnalyzer`]: text extraction from uploads ([`RemoteDocumentAnalyzer`])

mod books;
mod document;
mod gemini;
mod youtube;

pub use books::GoogleBooksClient;
pub use document::RemoteDocumentAnalyzer;
pub use gemini::GeminiClient;
pub use youtube::YouTubeClient;

use crate::config::ProviderConfig;
use crate::error::{ProviderError, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Result type for provider calls
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// Generative text model: prompt in, text out
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for `prompt`
    async fn generate(&self, prompt: &str) -> ProviderResult<String>;
}

/// One video search hit
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoSnippet {
    /// Provider video id
    pub video_id: String,
    /// Video title
    pub title: String,
    /// Video description
    pub description: String,
}

/// Video search: query in, ranked snippets out
#[async_trait]
pub trait VideoSearch: Send + Sync {
    /// Search for up to `max_results` videos
    async fn search(&self, query: &str, max_results: u32) -> ProviderResult<Vec<VideoSnippet>>;
}

/// One book search hit
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BookVolume {
    /// Book title
    pub title: String,
    /// Link to the book's information page
    pub info_link: Option<String>,
    /// Author names (possibly empty)
    pub authors: Vec<String>,
}

/// Book search: query in, volume list out
#[async_trait]
pub trait BookSearch: Send + Sync {
    /// Search for up to `max_results` volumes
    async fn search(&self, query: &str, max_results: u32) -> ProviderResult<Vec<BookVolume>>;
}

/// Text extracted from an uploaded document
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtractedDocument {
    /// Extracted (or OCR'd) text
    pub text: String,
    /// Page count, if the analyzer reports it
    pub num_pages: Option<u32>,
}

/// Document analyzer: binary in, extracted text and page count out
#[async_trait]
pub trait DocumentAnalyzer: Send + Sync {
    /// Extract text from `document`
    ///
    /// Fails with [`ProviderError::NoExtractableText`] when the document has
    /// no text layer and OCR found nothing.
    async fn analyze(&self, document: &[u8], file_name: Option<&str>)
    -> ProviderResult<ExtractedDocument>;
}

/// The set of content providers used for stage content and pathways
#[derive(Clone)]
pub struct Providers {
    /// Generative text model
    pub text: Arc<dyn TextGenerator>,
    /// Video search
    pub videos: Arc<dyn VideoSearch>,
    /// Book search
    pub books: Arc<dyn BookSearch>,
}

impl Providers {
    /// Build the HTTP-backed providers described by `config`
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        Ok(Self {
            text: Arc::new(GeminiClient::new(config)?),
            videos: Arc::new(YouTubeClient::new(config)?),
            books: Arc::new(GoogleBooksClient::new(config)?),
        })
    }
}

/// Build the document analyzer described by `config`, if one is configured
pub fn document_analyzer_from_config(
    config: &ProviderConfig,
) -> Result<Option<Arc<dyn DocumentAnalyzer>>> {
    match &config.document_analyzer_url {
        Some(url) => Ok(Some(Arc::new(RemoteDocumentAnalyzer::new(
            url.clone(),
            config.request_timeout,
        )?))),
        None => Ok(None),
    }
}

/// Build an HTTP client with the configured request timeout
pub(crate) fn http_client(timeout: std::time::Duration) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("study-pathways/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

/// Turn a non-success response into a [`ProviderError::Status`]
pub(crate) async fn ensure_success(
    provider: &'static str,
    response: reqwest::Response,
) -> ProviderResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = if body.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unknown status")
            .to_string()
    } else {
        body.chars().take(500).collect()
    };
    Err(ProviderError::Status {
        provider,
        status: status.as_u16(),
        message,
    })
}

/// Remove a surrounding Markdown code fence (```html ... ```) from model output
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // drop the info string (e.g. "html" or "json") on the opening line
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_code_fences_handles_fenced_and_plain_text() {
        assert_eq!(strip_code_fences("<p>hi</p>"), "<p>hi</p>");
        assert_eq!(strip_code_fences("```html\n<p>hi</p>\n```"), "<p>hi</p>");
        assert_eq!(strip_code_fences("  ```\n{\"a\":1}\n```  "), "{\"a\":1}");
        assert_eq!(strip_code_fences("```json\n{\"a\":1}"), "{\"a\":1}");
    }
}

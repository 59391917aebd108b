//! Remote document analyzer client.
//!
//! PDF parsing and OCR run in a separate service. It accepts the raw
//! document as the request body and answers with
//! `{"text": "...", "numPages": 3}`.

use super::{DocumentAnalyzer, ExtractedDocument, ProviderResult, ensure_success, http_client};
use crate::error::{ProviderError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const PROVIDER: &str = "document-analyzer";

/// [`DocumentAnalyzer`] that forwards documents to an HTTP extraction service
pub struct RemoteDocumentAnalyzer {
    http: reqwest::Client,
    url: String,
}

impl RemoteDocumentAnalyzer {
    /// Create an analyzer posting to `url`
    pub fn new(url: String, timeout: Duration) -> Result<Self> {
        Ok(Self {
            http: http_client(timeout)?,
            url,
        })
    }
}

#[derive(Deserialize)]
struct AnalyzerResponse {
    #[serde(default)]
    text: String,
    #[serde(default, alias = "num_pages", rename = "numPages")]
    num_pages: Option<u32>,
}

#[async_trait]
impl DocumentAnalyzer for RemoteDocumentAnalyzer {
    async fn analyze(
        &self,
        document: &[u8],
        file_name: Option<&str>,
    ) -> ProviderResult<ExtractedDocument> {
        let mut request = self
            .http
            .post(&self.url)
            .header(reqwest::header::CONTENT_TYPE, "application/pdf")
            .body(document.to_vec());
        if let Some(name) = file_name {
            request = request.query(&[("filename", name)]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(PROVIDER, e))?;
        let response = ensure_success(PROVIDER, response).await?;

        let parsed: AnalyzerResponse =
            response
                .json()
                .await
                .map_err(|e| ProviderError::InvalidResponse {
                    provider: PROVIDER,
                    message: e.to_string(),
                })?;

        if parsed.text.trim().is_empty() {
            return Err(ProviderError::NoExtractableText);
        }

        tracing::debug!(
            bytes = document.len(),
            chars = parsed.text.len(),
            pages = ?parsed.num_pages,
            "document analyzed"
        );
        Ok(ExtractedDocument {
            text: parsed.text,
            num_pages: parsed.num_pages,
        })
    }
}

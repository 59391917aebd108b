//! Topic and level inference for uploaded study material.

use crate::config::UploadConfig;
use crate::content::prompts;
use crate::error::{Error, ProviderError, Result};
use crate::providers::{DocumentAnalyzer, TextGenerator, strip_code_fences};
use crate::types::DocumentInsights;
use serde::Deserialize;
use std::sync::Arc;

/// Fields the model is asked to infer
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InferredFields {
    topic: String,
    grade: String,
    #[serde(default)]
    subtopics: Vec<String>,
    #[serde(default)]
    main_concepts: Vec<String>,
}

/// Extracts text from an uploaded document and infers what it teaches
#[derive(Clone)]
pub struct DocumentInsightService {
    analyzer: Option<Arc<dyn DocumentAnalyzer>>,
    text: Arc<dyn TextGenerator>,
    config: UploadConfig,
}

impl DocumentInsightService {
    /// Create the service; without an analyzer every upload is rejected as
    /// not supported
    pub fn new(
        analyzer: Option<Arc<dyn DocumentAnalyzer>>,
        text: Arc<dyn TextGenerator>,
        config: UploadConfig,
    ) -> Self {
        Self {
            analyzer,
            text,
            config,
        }
    }

    /// Whether a document analyzer is configured
    pub fn is_enabled(&self) -> bool {
        self.analyzer.is_some()
    }

    /// Analyze `document` and infer its topic, level and concepts
    pub async fn analyze(
        &self,
        document: &[u8],
        file_name: Option<&str>,
    ) -> Result<DocumentInsights> {
        let analyzer = self
            .analyzer
            .as_ref()
            .ok_or_else(|| Error::NotSupported("document analysis is not configured".into()))?;

        if document.is_empty() {
            return Err(Error::InvalidRequest("uploaded document is empty".into()));
        }
        if document.len() > self.config.max_bytes {
            return Err(Error::InvalidRequest(format!(
                "uploaded document exceeds {} bytes",
                self.config.max_bytes
            )));
        }

        let extracted = analyzer.analyze(document, file_name).await?;
        let text = extracted.text.trim();
        if text.is_empty() {
            return Err(ProviderError::NoExtractableText.into());
        }

        let excerpt = truncate_chars(text, self.config.analysis_chars);
        let reply = self
            .text
            .generate(&prompts::document_insights(excerpt))
            .await?;
        let fields = parse_inferred(&reply)?;

        tracing::info!(
            topic = %fields.topic,
            grade = %fields.grade,
            pages = ?extracted.num_pages,
            "inferred document insights"
        );

        Ok(DocumentInsights {
            topic: fields.topic,
            grade: fields.grade,
            subtopics: fields.subtopics,
            main_concepts: fields.main_concepts,
            text_preview: truncate_chars(text, self.config.preview_chars).to_string(),
            num_pages: extracted.num_pages,
        })
    }
}

/// Pull the JSON object out of a model reply (which may add fences or prose)
fn parse_inferred(reply: &str) -> Result<InferredFields> {
    let body = strip_code_fences(reply);
    let json = match (body.find('{'), body.rfind('}')) {
        (Some(start), Some(end)) if start < end => &body[start..=end],
        _ => body,
    };

    let fields: InferredFields =
        serde_json::from_str(json).map_err(|e| ProviderError::InvalidResponse {
            provider: "text-model",
            message: format!("document insights were not valid JSON: {e}"),
        })?;

    if fields.topic.trim().is_empty() || fields.grade.trim().is_empty() {
        return Err(ProviderError::InvalidResponse {
            provider: "text-model",
            message: "document insights are missing topic or grade".into(),
        }
        .into());
    }
    Ok(fields)
}

/// Longest prefix of `text` with at most `max` characters
fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

//! Generative text model client (Gemini `generateContent` REST endpoint).

use super::{ProviderResult, TextGenerator, ensure_success, http_client, strip_code_fences};
use crate::config::ProviderConfig;
use crate::error::{ProviderError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const PROVIDER: &str = "gemini";

/// [`TextGenerator`] backed by the Gemini REST API
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl GeminiClient {
    /// Create a client from provider configuration
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        Ok(Self {
            http: http_client(config.request_timeout)?,
            base_url: config.gemini_base_url.trim_end_matches('/').to_string(),
            model: config.gemini_model.clone(),
            api_key: config.api_key.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [RequestContent<'a>; 1],
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: [RequestPart<'a>; 1],
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> ProviderResult<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ProviderError::NotConfigured { provider: PROVIDER })?;

        let body = GenerateRequest {
            contents: [RequestContent {
                parts: [RequestPart { text: prompt }],
            }],
        };

        let response = self
            .http
            .post(self.endpoint())
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(PROVIDER, e))?;
        let response = ensure_success(PROVIDER, response).await?;

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse {
                provider: PROVIDER,
                message: e.to_string(),
            })?;

        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default();

        let text = strip_code_fences(&text);
        if text.is_empty() {
            return Err(ProviderError::EmptyResponse { provider: PROVIDER });
        }

        tracing::debug!(
            model = %self.model,
            prompt_chars = prompt.len(),
            response_chars = text.len(),
            "text generation succeeded"
        );
        Ok(text.to_string())
    }
}

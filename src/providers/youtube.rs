//! Video search client (YouTube Data API v3 `search.list`).

use super::{ProviderResult, VideoSearch, VideoSnippet, ensure_success, http_client};
use crate::config::ProviderConfig;
use crate::error::{ProviderError, Result};
use async_trait::async_trait;
use serde::Deserialize;

const PROVIDER: &str = "youtube";

/// [`VideoSearch`] backed by the YouTube Data API
pub struct YouTubeClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl YouTubeClient {
    /// Create a client from provider configuration
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        Ok(Self {
            http: http_client(config.request_timeout)?,
            base_url: config.youtube_base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Deserialize)]
struct SearchItem {
    id: ItemId,
    snippet: Snippet,
}

#[derive(Deserialize)]
struct ItemId {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
}

#[derive(Deserialize)]
struct Snippet {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
}

#[async_trait]
impl VideoSearch for YouTubeClient {
    async fn search(&self, query: &str, max_results: u32) -> ProviderResult<Vec<VideoSnippet>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ProviderError::NotConfigured { provider: PROVIDER })?;
        let max_results = max_results.to_string();

        let response = self
            .http
            .get(format!("{}/youtube/v3/search", self.base_url))
            .query(&[
                ("part", "snippet"),
                ("q", query),
                ("type", "video"),
                ("maxResults", max_results.as_str()),
                ("order", "relevance"),
                ("safeSearch", "strict"),
                ("videoEmbeddable", "true"),
                ("relevanceLanguage", "en"),
                ("videoDuration", "medium"),
                ("key", api_key),
            ])
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(PROVIDER, e))?;
        let response = ensure_success(PROVIDER, response).await?;

        let parsed: SearchResponse =
            response
                .json()
                .await
                .map_err(|e| ProviderError::InvalidResponse {
                    provider: PROVIDER,
                    message: e.to_string(),
                })?;

        let videos: Vec<VideoSnippet> = parsed
            .items
            .into_iter()
            .filter_map(|item| {
                item.id.video_id.map(|video_id| VideoSnippet {
                    video_id,
                    title: item.snippet.title,
                    description: item.snippet.description,
                })
            })
            .collect();

        tracing::debug!(query, results = videos.len(), "video search completed");
        Ok(videos)
    }
}

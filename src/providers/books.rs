//! Book search client (Google Books `volumes` endpoint).

use super::{BookSearch, BookVolume, ProviderResult, ensure_success, http_client};
use crate::config::ProviderConfig;
use crate::error::{ProviderError, Result};
use async_trait::async_trait;
use serde::Deserialize;

const PROVIDER: &str = "books";

/// [`BookSearch`] backed by the Google Books API
pub struct GoogleBooksClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl GoogleBooksClient {
    /// Create a client from provider configuration
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        Ok(Self {
            http: http_client(config.request_timeout)?,
            base_url: config.books_base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }
}

#[derive(Deserialize)]
struct VolumesResponse {
    #[serde(default)]
    items: Vec<Volume>,
}

#[derive(Deserialize)]
struct Volume {
    #[serde(rename = "volumeInfo")]
    volume_info: VolumeInfo,
}

#[derive(Deserialize)]
struct VolumeInfo {
    #[serde(default)]
    title: String,
    #[serde(rename = "infoLink")]
    info_link: Option<String>,
    #[serde(default)]
    authors: Vec<String>,
}

#[async_trait]
impl BookSearch for GoogleBooksClient {
    async fn search(&self, query: &str, max_results: u32) -> ProviderResult<Vec<BookVolume>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ProviderError::NotConfigured { provider: PROVIDER })?;
        let max_results = max_results.to_string();

        let response = self
            .http
            .get(format!("{}/books/v1/volumes", self.base_url))
            .query(&[
                ("q", query),
                ("key", api_key),
                ("maxResults", max_results.as_str()),
                ("orderBy", "relevance"),
                ("printType", "books"),
                ("filter", "paid-ebooks"),
            ])
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(PROVIDER, e))?;
        let response = ensure_success(PROVIDER, response).await?;

        let parsed: VolumesResponse =
            response
                .json()
                .await
                .map_err(|e| ProviderError::InvalidResponse {
                    provider: PROVIDER,
                    message: e.to_string(),
                })?;

        let volumes: Vec<BookVolume> = parsed
            .items
            .into_iter()
            .map(|volume| BookVolume {
                title: volume.volume_info.title,
                info_link: volume.volume_info.info_link,
                authors: volume.volume_info.authors,
            })
            .collect();

        tracing::debug!(query, results = volumes.len(), "book search completed");
        Ok(volumes)
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> GoogleBooksClient {
        let config = ProviderConfig {
            api_key: Some("books-key".into()),
            books_base_url: server.uri(),
            ..Default::default()
        };
        GoogleBooksClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn search_parses_volumes_with_and_without_authors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/books/v1/volumes"))
            .and(query_param("maxResults", "5"))
            .and(query_param("printType", "books"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [
                    { "volumeInfo": { "title": "Plant Biology", "infoLink": "https://books.example/1", "authors": ["A. Smith", "B. Jones"] } },
                    { "volumeInfo": { "title": "Anonymous Botany" } }
                ]
            })))
            .mount(&server)
            .await;

        let books = client_for(&server).search("plants", 5).await.unwrap();
        assert_eq!(books.len(), 2);
        assert_eq!(books[0].authors, vec!["A. Smith", "B. Jones"]);
        assert_eq!(books[1].info_link, None);
        assert!(books[1].authors.is_empty());
    }

    #[tokio::test]
    async fn search_maps_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("backend unavailable"))
            .mount(&server)
            .await;

        let err = client_for(&server).search("plants", 5).await.unwrap_err();
        assert_eq!(err.code(), "provider_status");
        assert_eq!(err.provider(), Some("books"));
    }
}

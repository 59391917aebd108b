//! Stage content generation
//!
//! [`ContentService`] turns a [`ContentRequest`] into the HTML fragment for
//! one content kind:
//! - `video`: three stage-aware searches, filtered and shuffled ([`videos`])
//! - `books`: one book search
//! - `websites`: search links into a curated site list ([`websites`])
//! - `ai-notes` / `ai-questions`: text generated by the model
//!
//! Every result is delivered inside `<div class="content-wrapper">`. Video
//! and book lists are preceded by a short model-written introduction whose
//! failure is logged and otherwise ignored.

pub(crate) mod prompts;
pub mod render;
pub(crate) mod videos;
pub mod websites;

use crate::error::Result;
use crate::providers::Providers;
use crate::types::{ContentKind, ContentRequest};
use futures::future::try_join_all;

/// Generates stage content from the configured providers
#[derive(Clone)]
pub struct ContentService {
    providers: Providers,
}

impl ContentService {
    /// Create a content service over `providers`
    pub fn new(providers: Providers) -> Self {
        Self { providers }
    }

    /// Generate the wrapped HTML fragment for `request`
    ///
    /// Unknown content kinds succeed with a "not supported yet" placeholder.
    /// Provider failures are returned as errors; callers decide how to
    /// present them.
    pub async fn generate(&self, request: &ContentRequest) -> Result<String> {
        tracing::debug!(
            kind = %request.kind,
            topic = %request.topic,
            stage = %request.stage,
            "generating stage content"
        );

        let body = match &request.kind {
            ContentKind::Video => self.videos(request).await?,
            ContentKind::Books => self.books(request).await?,
            ContentKind::Websites => self.websites(request),
            ContentKind::AiNotes => self.ai_notes(request).await?,
            ContentKind::AiQuestions => self.ai_questions(request).await?,
            ContentKind::Unsupported(kind) => render::unsupported(kind),
        };

        Ok(render::content_wrapper(&body))
    }

    async fn videos(&self, request: &ContentRequest) -> Result<String> {
        let queries = videos::search_queries(&request.topic, &request.grade, &request.stage);
        let searches = try_join_all(
            queries
                .iter()
                .map(|query| self.providers.videos.search(query, videos::RESULTS_PER_QUERY)),
        );
        let (results, intro) = tokio::join!(searches, self.intro(request, "video"));

        let candidates: Vec<_> = results?.into_iter().flatten().collect();
        let found = candidates.len();
        let selected = videos::select(candidates, &request.topic, &mut rand::thread_rng());
        tracing::debug!(found, selected = selected.len(), "filtered video results");

        Ok(format!(
            "{}{}{}",
            render::heading("Video Resources", request, true),
            intro,
            render::video_list(&selected)
        ))
    }

    async fn books(&self, request: &ContentRequest) -> Result<String> {
        let query = format!(
            "{} {} {} education",
            request.topic, request.grade, request.stage
        );
        let (books, intro) = tokio::join!(
            self.providers.books.search(&query, 5),
            self.intro(request, "book")
        );

        Ok(format!(
            "{}{}{}",
            render::heading("Books", request, true),
            intro,
            render::book_list(&books?)
        ))
    }

    fn websites(&self, request: &ContentRequest) -> String {
        format!(
            "{}<p>These links will take you to search results for the topic on various educational platforms:</p>{}",
            render::heading("Useful Websites", request, true),
            websites::link_list(&request.topic, &request.grade, &request.stage)
        )
    }

    async fn ai_notes(&self, request: &ContentRequest) -> Result<String> {
        let notes = self
            .providers
            .text
            .generate(&prompts::ai_notes(
                &request.topic,
                &request.grade,
                &request.stage,
            ))
            .await?;

        Ok(format!(
            "{}<div class=\"ai-content\">{notes}</div>",
            render::heading("AI-generated Notes", request, true)
        ))
    }

    async fn ai_questions(&self, request: &ContentRequest) -> Result<String> {
        let questions = self
            .providers
            .text
            .generate(&prompts::ai_questions(&request.topic, &request.grade))
            .await?;

        Ok(format!(
            "{}<div class=\"ai-content\"><ol>{questions}</ol></div>",
            render::heading("AI-generated Questions", request, false)
        ))
    }

    /// Introduction paragraph; empty when the model fails
    async fn intro(&self, request: &ContentRequest, resource: &str) -> String {
        let prompt =
            prompts::content_intro(&request.topic, &request.grade, &request.stage, resource);
        match self.providers.text.generate(&prompt).await {
            Ok(text) => render::intro(Some(&text)),
            Err(e) => {
                tracing::warn!(error = %e, resource, "content introduction failed, omitting it");
                render::intro(None)
            }
        }
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, ProviderError};
    use crate::hub::test_helpers::{StubBooks, StubText, StubVideos, providers};
    use crate::providers::{BookVolume, VideoSnippet};
    use std::sync::Arc;

    fn request(kind: &str) -> ContentRequest {
        ContentRequest::from_params(
            Some("Photosynthesis"),
            Some("Middle School"),
            Some(kind),
            Some("Stage 1: Basics"),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn ai_questions_are_wrapped_in_ordered_list() {
        let text = Arc::new(StubText::replying("<li>Why are leaves green?</li>"));
        let service = ContentService::new(providers(
            text.clone(),
            Arc::new(StubVideos::empty()),
            Arc::new(StubBooks::empty()),
        ));

        let html = service.generate(&request("ai-questions")).await.unwrap();

        assert_eq!(
            html,
            "<div class=\"content-wrapper\">\
             <h2>AI-generated Questions for Photosynthesis (Middle School level)</h2>\
             <div class=\"ai-content\"><ol><li>Why are leaves green?</li></ol></div></div>"
        );
        assert_eq!(text.calls(), 1);
    }

    #[tokio::test]
    async fn ai_notes_prompt_mentions_stage() {
        let text = Arc::new(StubText::replying("<h3>Chlorophyll</h3>"));
        let service = ContentService::new(providers(
            text.clone(),
            Arc::new(StubVideos::empty()),
            Arc::new(StubBooks::empty()),
        ));

        let html = service.generate(&request("ai-notes")).await.unwrap();

        assert!(html.contains(
            "<h2>AI-generated Notes for Photosynthesis (Middle School level) - Stage 1: Basics</h2>"
        ));
        assert!(html.contains("<div class=\"ai-content\"><h3>Chlorophyll</h3></div>"));
        assert!(text.prompts()[0].contains("\"Stage 1: Basics\""));
    }

    #[tokio::test]
    async fn videos_issue_three_queries_and_keep_relevant_hits() {
        let videos = Arc::new(StubVideos::replying(vec![
            VideoSnippet {
                video_id: "good".into(),
                title: "Photosynthesis lesson".into(),
                description: String::new(),
            },
            VideoSnippet {
                video_id: "short".into(),
                title: "Photosynthesis lesson #shorts".into(),
                description: String::new(),
            },
        ]));
        let service = ContentService::new(providers(
            Arc::new(StubText::replying("Videos help.")),
            videos.clone(),
            Arc::new(StubBooks::empty()),
        ));

        let html = service.generate(&request("video")).await.unwrap();

        assert_eq!(videos.queries().len(), 3);
        assert!(html.contains("<p>Videos help.</p>"));
        assert_eq!(html.matches("watch?v=good").count(), 1, "duplicates are removed");
        assert!(!html.contains("watch?v=short"));
    }

    #[tokio::test]
    async fn videos_without_relevant_hits_show_notice() {
        let service = ContentService::new(providers(
            Arc::new(StubText::failing()),
            Arc::new(StubVideos::empty()),
            Arc::new(StubBooks::empty()),
        ));

        let html = service.generate(&request("video")).await.unwrap();

        assert!(html.contains(render::NO_RELEVANT_VIDEOS));
        assert!(
            !html.contains("<p></p>"),
            "a failed introduction renders nothing"
        );
    }

    #[tokio::test]
    async fn books_render_list_and_propagate_search_failure() {
        let ok = ContentService::new(providers(
            Arc::new(StubText::replying("Read these.")),
            Arc::new(StubVideos::empty()),
            Arc::new(StubBooks::replying(vec![BookVolume {
                title: "Leaves".into(),
                info_link: Some("https://books.example/leaves".into()),
                authors: vec![],
            }])),
        ));
        let html = ok.generate(&request("books")).await.unwrap();
        assert!(html.contains("<h2>Books for Photosynthesis (Middle School level) - Stage 1: Basics</h2><p>Read these.</p>"));
        assert!(html.contains("Leaves</a> by Unknown"));

        let failing = ContentService::new(providers(
            Arc::new(StubText::replying("Read these.")),
            Arc::new(StubVideos::empty()),
            Arc::new(StubBooks::failing(500)),
        ));
        let err = failing.generate(&request("books")).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Provider(ProviderError::Status { status: 500, .. })
        ));
    }

    #[tokio::test]
    async fn websites_need_no_provider() {
        let text = Arc::new(StubText::failing());
        let service = ContentService::new(providers(
            text.clone(),
            Arc::new(StubVideos::empty()),
            Arc::new(StubBooks::empty()),
        ));

        let html = service.generate(&request("websites")).await.unwrap();

        assert!(html.starts_with("<div class=\"content-wrapper\"><h2>Useful Websites for"));
        assert_eq!(html.matches("<li>").count(), websites::SITES_PER_STAGE);
        assert_eq!(text.calls(), 0);
    }

    #[tokio::test]
    async fn unknown_kind_gets_placeholder() {
        let service = ContentService::new(providers(
            Arc::new(StubText::failing()),
            Arc::new(StubVideos::empty()),
            Arc::new(StubBooks::empty()),
        ));

        let html = service.generate(&request("podcasts")).await.unwrap();

        assert_eq!(
            html,
            "<div class=\"content-wrapper\"><p>Content type podcasts is not supported yet.</p></div>"
        );
    }
}

//! Study pathway generation
//!
//! A pathway is `stage_count` independently generated stages joined with
//! newlines. Stages are requested from the model concurrently. A stage that
//! fails is replaced by an inline error block so the rest of the pathway is
//! still usable; only when every stage fails does the request fail.
//!
//! Complete pathways (no failed stage) are cached under
//! `pathway_<topic>_<grade>` for the configured cache TTL.

use crate::config::PathwayConfig;
use crate::content::{prompts, render};
use crate::error::{Error, Result};
use crate::providers::TextGenerator;
use crate::store::KeyValueStore;
use futures::future::join_all;
use std::sync::Arc;

/// A generated (or cached) pathway
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pathway {
    /// Pathway HTML
    pub html: String,
    /// Whether the pathway was served from the cache
    pub cached: bool,
    /// Number of stages that had to be replaced by an error block
    pub failed_stages: u32,
}

/// Generates and caches study pathways
#[derive(Clone)]
pub struct PathwayService {
    text: Arc<dyn TextGenerator>,
    cache: Arc<dyn KeyValueStore<String>>,
    config: PathwayConfig,
}

impl PathwayService {
    /// Create a pathway service
    pub fn new(
        text: Arc<dyn TextGenerator>,
        cache: Arc<dyn KeyValueStore<String>>,
        config: PathwayConfig,
    ) -> Self {
        Self {
            text,
            cache,
            config,
        }
    }

    /// Cache key of the pathway for `topic` and `grade`
    pub fn cache_key(topic: &str, grade: &str) -> String {
        format!("pathway_{topic}_{grade}")
    }

    /// Return the pathway for `topic`/`grade`, generating it on a cache miss
    ///
    /// # Errors
    ///
    /// [`Error::InvalidRequest`] when either parameter is missing or blank;
    /// [`Error::Provider`] when every stage failed.
    pub async fn pathway(&self, topic: Option<&str>, grade: Option<&str>) -> Result<Pathway> {
        let (topic, grade) = match (non_blank(topic), non_blank(grade)) {
            (Some(topic), Some(grade)) => (topic, grade),
            _ => {
                return Err(Error::InvalidRequest(
                    "topic and grade are required".into(),
                ));
            }
        };

        let key = Self::cache_key(topic, grade);
        match self.cache.get(&key).await {
            Ok(Some(html)) => {
                tracing::debug!(topic, grade, "serving cached pathway");
                return Ok(Pathway {
                    html,
                    cached: true,
                    failed_stages: 0,
                });
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "pathway cache read failed"),
        }

        let stage_count = self.config.stage_count;
        let results = join_all((1..=stage_count).map(|stage| {
            let prompt = prompts::pathway_stage(topic, grade, stage, stage_count);
            async move { (stage, self.text.generate(&prompt).await) }
        }))
        .await;

        let mut stages = Vec::with_capacity(results.len());
        let mut failed_stages = 0;
        let mut last_error = None;
        for (stage, result) in results {
            match result {
                Ok(html) => stages.push(html),
                Err(e) => {
                    tracing::warn!(error = %e, stage, topic, grade, "pathway stage failed");
                    failed_stages += 1;
                    stages.push(render::stage_error(stage));
                    last_error = Some(e);
                }
            }
        }

        if failed_stages == stage_count {
            if let Some(e) = last_error {
                return Err(Error::Provider(e));
            }
        }

        let html = stages.join("\n");
        if failed_stages == 0 {
            if let Err(e) = self
                .cache
                .set(&key, html.clone(), Some(self.config.cache_ttl))
                .await
            {
                tracing::warn!(error = %e, "failed to cache pathway");
            }
        }

        tracing::info!(topic, grade, failed_stages, "generated study pathway");
        Ok(Pathway {
            html,
            cached: false,
            failed_stages,
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

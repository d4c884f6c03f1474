//! Cross-encoder reranker implementations.
//!
//! The reranker is a scoped, reusable resource: built once at context
//! construction and shared across queries, never re-acquired per call.
//! The HTTP implementation targets a text-embeddings-inference style
//! `/rerank` endpoint: `POST {query, texts}` returning
//! `[{index, score}, …]`.
//!
//! When the reranker is disabled (or unreachable and the caller opts
//! out), the pipeline returns fusion order instead — see
//! [`ragkit_core::pipeline::hybrid_search`].

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use ragkit_core::rerank::CrossEncoder;
use ragkit_core::Error as CoreError;

use crate::config::RerankerConfig;

/// Cross-encoder backed by an HTTP rerank endpoint.
pub struct HttpCrossEncoder {
    http: reqwest::Client,
    url: String,
}

#[derive(Debug, Deserialize)]
struct RerankEntry {
    index: usize,
    score: f64,
}

impl HttpCrossEncoder {
    pub fn new(config: &RerankerConfig) -> Result<Self> {
        let base = config
            .base_url
            .as_deref()
            .ok_or_else(|| anyhow!("reranker.base_url required for http provider"))?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            url: format!("{}/rerank", base.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl CrossEncoder for HttpCrossEncoder {
    async fn score(&self, query: &str, texts: &[String]) -> ragkit_core::Result<Vec<f64>> {
        let body = serde_json::json!({
            "query": query,
            "texts": texts,
        });

        let response = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| CoreError::Collaborator(format!("rerank request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(CoreError::Collaborator(format!(
                "rerank endpoint returned {status}: {body_text}"
            )));
        }

        let entries: Vec<RerankEntry> = response
            .json()
            .await
            .map_err(|e| CoreError::Collaborator(format!("invalid rerank response: {e}")))?;

        // The endpoint returns entries sorted by score; restore input order.
        let mut scores = vec![0.0f64; texts.len()];
        for entry in entries {
            if entry.index >= texts.len() {
                return Err(CoreError::Collaborator(format!(
                    "rerank response index {} out of range for {} texts",
                    entry.index,
                    texts.len()
                )));
            }
            scores[entry.index] = entry.score;
        }
        Ok(scores)
    }
}

/// Build the configured reranker, or `None` when disabled.
///
/// `None` is the documented degradation: the pipeline then presents
/// fusion ranks as fusion ranks, never as reranked ones.
pub fn create_reranker(config: &RerankerConfig) -> Result<Option<Box<dyn CrossEncoder>>> {
    match config.provider.as_str() {
        "disabled" => Ok(None),
        "http" => Ok(Some(Box::new(HttpCrossEncoder::new(config)?))),
        other => Err(anyhow!("Unknown reranker provider: {}", other)),
    }
}

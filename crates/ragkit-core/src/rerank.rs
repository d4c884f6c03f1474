//! Cross-encoder reranking.
//!
//! The [`CrossEncoder`] trait is the narrow interface to the external
//! relevance scorer: given a query and candidate texts, return one scalar
//! per text (higher = more relevant, stateless). [`rerank`] re-sorts
//! candidates by those scores, overriding the fusion order entirely —
//! fusion rank only selects which candidates were worth scoring.

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::models::{Collection, ScoredDoc};

/// External pairwise relevance scorer.
///
/// Implementations must be `Send + Sync`; the scorer is a scoped,
/// reusable resource initialized once per process, not re-acquired per
/// query.
#[async_trait]
pub trait CrossEncoder: Send + Sync {
    /// Score each `(query, text)` pair, returning one score per text in
    /// input order.
    async fn score(&self, query: &str, texts: &[String]) -> Result<Vec<f64>>;
}

/// Re-sort `candidates` by cross-encoder relevance, descending.
///
/// Scores replace the candidates' prior (fusion) scores. Ties preserve
/// input order, which makes reranking idempotent for a fixed scorer:
/// reranking an already-reranked list reproduces the same order.
pub async fn rerank(
    encoder: &dyn CrossEncoder,
    query: &str,
    candidates: &[ScoredDoc],
    collection: &Collection,
) -> Result<Vec<ScoredDoc>> {
    if candidates.is_empty() {
        return Ok(Vec::new());
    }

    let mut texts = Vec::with_capacity(candidates.len());
    for c in candidates {
        let doc = collection
            .get(&c.id)
            .ok_or_else(|| Error::UnknownDocument(c.id.clone()))?;
        texts.push(doc.text.clone());
    }

    let scores = encoder.score(query, &texts).await?;
    if scores.len() != candidates.len() {
        return Err(Error::Collaborator(format!(
            "cross-encoder returned {} scores for {} candidates",
            scores.len(),
            candidates.len()
        )));
    }

    let mut reranked: Vec<ScoredDoc> = candidates
        .iter()
        .zip(scores)
        .map(|(c, score)| ScoredDoc::new(c.id.clone(), score))
        .collect();
    reranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    Ok(reranked)
}

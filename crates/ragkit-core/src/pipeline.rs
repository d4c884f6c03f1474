//! Hybrid retrieval pipeline and context assembly.
//!
//! A query flows through a linear pipeline: lexical search and vector
//! search run independently over the same immutable collection, their
//! ranked lists are fused, the fused prefix is optionally refined by the
//! cross-encoder, and the top `limit` documents are concatenated into the
//! context block handed to the generation call.
//!
//! Each path contributes its top `2 × limit` candidates before fusion;
//! the deeper cutoff bounds reranker cost while leaving fusion enough
//! overlap to work with.

use crate::error::{Error, Result};
use crate::fusion::{reciprocal_rank_fusion, weighted_set_fusion, DEFAULT_RRF_K};
use crate::lexical::LexicalIndex;
use crate::models::{Collection, ScoredDoc};
use crate::rerank::{rerank, CrossEncoder};
use crate::vector::vector_search;

/// Which fusion formula merges the two ranked lists.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FusionStrategy {
    /// Rank-based reciprocal rank fusion (the default).
    ReciprocalRank { k: f64 },
    /// Presence-based weighted-set fusion (coarser alternative).
    WeightedSet { alpha: f64 },
}

impl Default for FusionStrategy {
    fn default() -> Self {
        FusionStrategy::ReciprocalRank { k: DEFAULT_RRF_K }
    }
}

/// Tuning for a single hybrid query.
#[derive(Debug, Clone)]
pub struct RetrievalParams {
    pub strategy: FusionStrategy,
    /// Final result count; each path fetches `2 × limit` candidates.
    pub limit: usize,
}

impl Default for RetrievalParams {
    fn default() -> Self {
        Self {
            strategy: FusionStrategy::default(),
            limit: 5,
        }
    }
}

/// Run the full hybrid pipeline for one query.
///
/// `query_vec` is the precomputed query embedding; computing it is the
/// caller's responsibility (and the caller's failure to handle — vector
/// search cannot proceed without it). When `encoder` is `None` the
/// pipeline returns fusion order; that is the documented degradation for
/// an unavailable reranker, and the scores in the output are then fusion
/// scores, never a mix of the two.
pub async fn hybrid_search(
    index: &LexicalIndex,
    collection: &Collection,
    query: &str,
    query_vec: &[f32],
    params: &RetrievalParams,
    encoder: Option<&dyn CrossEncoder>,
) -> Result<Vec<ScoredDoc>> {
    let candidate_k = params.limit.saturating_mul(2);

    let text_results = index.search(query, candidate_k);
    let vector_results = vector_search(query_vec, collection, candidate_k)?;

    let fused = match params.strategy {
        FusionStrategy::ReciprocalRank { k } => {
            reciprocal_rank_fusion(&text_results, &vector_results, k)
        }
        FusionStrategy::WeightedSet { alpha } => {
            weighted_set_fusion(&text_results, &vector_results, alpha)
        }
    };

    let mut results = match encoder {
        Some(encoder) => rerank(encoder, query, &fused, collection).await?,
        None => fused,
    };
    results.truncate(params.limit);
    Ok(results)
}

/// Concatenate the top `limit` results into a `id: text` context block.
pub fn build_context(
    collection: &Collection,
    results: &[ScoredDoc],
    limit: usize,
) -> Result<String> {
    let mut lines = Vec::with_capacity(limit.min(results.len()));
    for r in results.iter().take(limit) {
        let doc = collection
            .get(&r.id)
            .ok_or_else(|| Error::UnknownDocument(r.id.clone()))?;
        lines.push(format!("{}: {}", doc.id, doc.text));
    }
    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Document;
    use crate::rerank::CrossEncoder;
    use async_trait::async_trait;

    /// Scores by text length — deterministic and order-insensitive.
    struct LengthEncoder;

    #[async_trait]
    impl CrossEncoder for LengthEncoder {
        async fn score(&self, _query: &str, texts: &[String]) -> Result<Vec<f64>> {
            Ok(texts.iter().map(|t| t.len() as f64).collect())
        }
    }

    fn insect_collection() -> Collection {
        let docs = vec![
            ("carpenter-1", "The California carpenter bee nests in wood tunnels.", [1.0, 0.0]),
            (
                "digger-1",
                "Centris pallida, the digger bee, lives in desert burrows in the ground.",
                [0.9, 0.1],
            ),
            ("honey-1", "The western honey bee lives in managed hives.", [0.0, 1.0]),
            ("hoverfly-1", "The aphideater hoverfly feeds on garden aphids.", [0.1, 0.9]),
        ];
        Collection::new(
            docs.into_iter()
                .map(|(id, text, v)| Document {
                    id: id.to_string(),
                    text: text.to_string(),
                    embedding: Some(v.to_vec()),
                })
                .collect(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_hybrid_end_to_end_without_encoder() {
        let c = insect_collection();
        let index = LexicalIndex::build(&c).unwrap();
        let params = RetrievalParams {
            strategy: FusionStrategy::ReciprocalRank { k: DEFAULT_RRF_K },
            limit: 2,
        };
        // Query vector near the digger/carpenter cluster; query terms hit
        // only the digger document.
        let results = hybrid_search(&index, &c, "digger burrows", &[0.95, 0.05], &params, None)
            .await
            .unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, "digger-1");
    }

    #[tokio::test]
    async fn test_hybrid_rerank_overrides_fusion() {
        let c = insect_collection();
        let index = LexicalIndex::build(&c).unwrap();
        let params = RetrievalParams {
            strategy: FusionStrategy::default(),
            limit: 4,
        };
        let results = hybrid_search(
            &index,
            &c,
            "bee",
            &[0.5, 0.5],
            &params,
            Some(&LengthEncoder),
        )
        .await
        .unwrap();
        // LengthEncoder puts the longest text first regardless of fusion.
        assert_eq!(results[0].id, "digger-1");
        for w in results.windows(2) {
            assert!(w[0].score >= w[1].score);
        }
    }

    #[tokio::test]
    async fn test_hybrid_respects_limit() {
        let c = insect_collection();
        let index = LexicalIndex::build(&c).unwrap();
        let params = RetrievalParams {
            strategy: FusionStrategy::WeightedSet { alpha: 0.5 },
            limit: 1,
        };
        let results = hybrid_search(&index, &c, "bee", &[1.0, 0.0], &params, None)
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn test_hybrid_propagates_dimension_mismatch() {
        let c = insect_collection();
        let index = LexicalIndex::build(&c).unwrap();
        let err = hybrid_search(
            &index,
            &c,
            "bee",
            &[1.0, 0.0, 0.0],
            &RetrievalParams::default(),
            None,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { .. }));
    }

    #[test]
    fn test_build_context_format() {
        let c = insect_collection();
        let results = vec![ScoredDoc::new("honey-1", 1.0), ScoredDoc::new("digger-1", 0.5)];
        let ctx = build_context(&c, &results, 5).unwrap();
        let lines: Vec<&str> = ctx.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("honey-1: The western honey bee"));
        assert!(lines[1].starts_with("digger-1: Centris pallida"));

        // Truncation at the context boundary too.
        let ctx1 = build_context(&c, &results, 1).unwrap();
        assert_eq!(ctx1.lines().count(), 1);
    }

    #[test]
    fn test_build_context_unknown_id() {
        let c = insect_collection();
        let err = build_context(&c, &[ScoredDoc::new("nope", 1.0)], 5).unwrap_err();
        assert!(matches!(err, Error::UnknownDocument(_)));
    }
}

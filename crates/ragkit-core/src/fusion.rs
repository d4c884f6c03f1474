//! Rank fusion: merging the lexical and vector ranked lists.
//!
//! Lexical and vector scores are not on comparable scales, so the default
//! fusion is rank-based [Reciprocal Rank Fusion](reciprocal_rank_fusion):
//! absolute score magnitude from either path never enters the
//! computation. A coarser [weighted-set](weighted_set_fusion) variant is
//! kept as a configurable alternative.
//!
//! Both strategies deduplicate by document id: a document in both input
//! lists appears exactly once in the output, with combined contribution.

use std::collections::{HashMap, HashSet};

use crate::models::ScoredDoc;

/// Standard RRF k constant from Cormack, Clarke & Buettcher (SIGIR 2009).
///
/// Smaller k emphasizes top ranks; larger k flattens the contribution
/// curve. 60 is the conventional balance.
pub const DEFAULT_RRF_K: f64 = 60.0;

/// Reciprocal Rank Fusion of two ranked lists.
///
/// A document at 0-based rank `i` in a list contributes `1 / (i + k)` to
/// its accumulated score; contributions from both lists add. Documents
/// present in only one list still score from that list alone. Output is
/// ordered by descending fused score, ties by id ascending (the
/// accumulation map is unordered, so rank position cannot break ties
/// deterministically).
pub fn reciprocal_rank_fusion(
    text_results: &[ScoredDoc],
    vector_results: &[ScoredDoc],
    k: f64,
) -> Vec<ScoredDoc> {
    let mut scores: HashMap<&str, f64> = HashMap::new();

    for (i, doc) in text_results.iter().enumerate() {
        *scores.entry(doc.id.as_str()).or_insert(0.0) += 1.0 / (i as f64 + k);
    }
    for (i, doc) in vector_results.iter().enumerate() {
        *scores.entry(doc.id.as_str()).or_insert(0.0) += 1.0 / (i as f64 + k);
    }

    let mut fused: Vec<ScoredDoc> = scores
        .into_iter()
        .map(|(id, score)| ScoredDoc::new(id, score))
        .collect();
    fused.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.id.cmp(&b.id))
    });
    fused
}

/// Weighted-set fusion: a coarser, presence-based alternative to RRF.
///
/// Documents in both lists get weight `alpha`; documents only in the text
/// list get `1 - alpha`; documents only in the vector list get `alpha`.
/// Within a weight bucket the text-list-then-vector-list traversal order
/// is preserved (stable sort), so there is no within-bucket ranking
/// signal beyond that — an accepted simplification, not a bug.
pub fn weighted_set_fusion(
    text_results: &[ScoredDoc],
    vector_results: &[ScoredDoc],
    alpha: f64,
) -> Vec<ScoredDoc> {
    let text_ids: HashSet<&str> = text_results.iter().map(|d| d.id.as_str()).collect();
    let vector_ids: HashSet<&str> = vector_results.iter().map(|d| d.id.as_str()).collect();

    let mut combined: Vec<ScoredDoc> = Vec::new();
    for doc in text_results {
        let weight = if vector_ids.contains(doc.id.as_str()) {
            alpha
        } else {
            1.0 - alpha
        };
        combined.push(ScoredDoc::new(doc.id.clone(), weight));
    }
    for doc in vector_results {
        if !text_ids.contains(doc.id.as_str()) {
            combined.push(ScoredDoc::new(doc.id.clone(), alpha));
        }
    }

    combined.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    combined
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs(ids: &[&str]) -> Vec<ScoredDoc> {
        // Input scores are deliberately arbitrary: fusion must ignore them.
        ids.iter()
            .enumerate()
            .map(|(i, id)| ScoredDoc::new(*id, 100.0 - i as f64))
            .collect()
    }

    #[test]
    fn test_rrf_exact_magnitudes() {
        // text = [D1, D2], vector = [D2, D3], k = 60:
        //   D2 = 1/(1+60) + 1/(0+60), D1 = 1/(0+60), D3 = 1/(1+60)
        let fused = reciprocal_rank_fusion(&docs(&["D1", "D2"]), &docs(&["D2", "D3"]), 60.0);

        assert_eq!(fused.len(), 3);
        assert_eq!(fused[0].id, "D2");
        assert_eq!(fused[1].id, "D1");
        assert_eq!(fused[2].id, "D3");

        assert!((fused[0].score - (1.0 / 61.0 + 1.0 / 60.0)).abs() < 1e-12);
        assert!((fused[1].score - 1.0 / 60.0).abs() < 1e-12);
        assert!((fused[2].score - 1.0 / 61.0).abs() < 1e-12);
    }

    #[test]
    fn test_rrf_ignores_input_scores() {
        let text = vec![ScoredDoc::new("a", 9000.0), ScoredDoc::new("b", 0.0001)];
        let vector = vec![ScoredDoc::new("b", 0.5), ScoredDoc::new("a", 0.4)];
        let fused = reciprocal_rank_fusion(&text, &vector, DEFAULT_RRF_K);
        // a: rank 0 + rank 1; b: rank 1 + rank 0 — dead tie despite the
        // wildly different input scores; id ascending breaks it.
        assert!((fused[0].score - fused[1].score).abs() < 1e-12);
        assert_eq!(fused[0].id, "a");
    }

    #[test]
    fn test_rrf_deduplicates() {
        let fused = reciprocal_rank_fusion(&docs(&["x", "y"]), &docs(&["y", "x"]), 60.0);
        assert_eq!(fused.len(), 2);
        let ids: Vec<&str> = fused.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids.iter().filter(|id| **id == "x").count(), 1);
    }

    #[test]
    fn test_rrf_single_list_preserves_order() {
        let fused = reciprocal_rank_fusion(&docs(&["a", "b", "c"]), &[], 60.0);
        let ids: Vec<&str> = fused.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_rrf_both_empty() {
        assert!(reciprocal_rank_fusion(&[], &[], 60.0).is_empty());
    }

    #[test]
    fn test_weighted_set_buckets() {
        // both lists: a; text only: b; vector only: c. alpha = 0.7.
        let fused = weighted_set_fusion(&docs(&["a", "b"]), &docs(&["a", "c"]), 0.7);
        assert_eq!(fused.len(), 3);
        assert_eq!(fused[0].id, "a");
        assert!((fused[0].score - 0.7).abs() < 1e-12);
        assert!((fused[1].score - 0.7).abs() < 1e-12); // c, vector-only = alpha
        assert_eq!(fused[1].id, "c");
        assert_eq!(fused[2].id, "b");
        assert!((fused[2].score - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_weighted_set_deduplicates() {
        let fused = weighted_set_fusion(&docs(&["a"]), &docs(&["a"]), 0.5);
        assert_eq!(fused.len(), 1);
        assert_eq!(fused[0].id, "a");
    }

    #[test]
    fn test_weighted_set_stable_within_bucket() {
        let fused = weighted_set_fusion(&docs(&["a", "b"]), &docs(&["c", "d"]), 0.5);
        // All weights equal (0.5): traversal order preserved.
        let ids: Vec<&str> = fused.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c", "d"]);
    }
}

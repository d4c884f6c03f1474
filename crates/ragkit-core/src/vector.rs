//! Vector (embedding) search over a document collection.
//!
//! A pure ranking function: the query embedding is computed by the caller
//! (via the external embedding collaborator), never here. Every document
//! in the collection must carry an embedding of the query's
//! dimensionality.

use crate::error::{Error, Result};
use crate::models::{Collection, ScoredDoc};

/// Cosine similarity of two equal-length vectors.
///
/// Returns `None` when either vector has zero norm — similarity is
/// undefined there, and callers rank such documents last rather than
/// dividing by zero.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f64> {
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (x, y) in a.iter().zip(b.iter()) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom <= f64::EPSILON {
        return None;
    }
    Some(dot / denom)
}

/// Rank all documents by cosine similarity to `query`, highest first.
///
/// Ties (including zero-norm documents, which rank below everything)
/// preserve original collection order. `limit` truncates; a limit at or
/// above the collection size returns the whole collection ranked.
///
/// # Errors
///
/// - [`Error::MalformedDocument`] if a document has no embedding.
/// - [`Error::DimensionMismatch`] if a document's embedding length
///   differs from the query's.
pub fn vector_search(
    query: &[f32],
    collection: &Collection,
    limit: usize,
) -> Result<Vec<ScoredDoc>> {
    let mut ranked: Vec<(usize, f64)> = Vec::with_capacity(collection.len());

    for (pos, doc) in collection.docs().iter().enumerate() {
        let embedding = doc.embedding.as_ref().ok_or(Error::MalformedDocument {
            id: doc.id.clone(),
            field: "embedding",
        })?;
        if embedding.len() != query.len() {
            return Err(Error::DimensionMismatch {
                id: doc.id.clone(),
                query: query.len(),
                document: embedding.len(),
            });
        }
        let score = cosine_similarity(query, embedding).unwrap_or(f64::NEG_INFINITY);
        ranked.push((pos, score));
    }

    ranked.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.0.cmp(&b.0))
    });
    ranked.truncate(limit);

    Ok(ranked
        .into_iter()
        .map(|(pos, score)| ScoredDoc::new(collection.docs()[pos].id.clone(), score))
        .collect())
}

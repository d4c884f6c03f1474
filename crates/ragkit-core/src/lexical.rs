//! Lexical (keyword) search over a document collection.
//!
//! [`LexicalIndex::build`] constructs an inverted index over every
//! document's `text` field; [`LexicalIndex::search`] answers free-text
//! queries with a TF-IDF-ranked list of matching documents. The index is
//! built once at startup and never mutated — rebuilding means re-running
//! `build`.
//!
//! # Scoring
//!
//! For each query term `t` present in the index:
//!
//! ```text
//! idf(t)      = 1 + ln(N / df(t))
//! score(d) += (tf(t, d) / len(d)) × idf(t)
//! ```
//!
//! where `N` is the collection size, `df` the number of documents
//! containing `t`, `tf` the in-document term count, and `len(d)` the
//! document's token count. Scores are deterministic for an identical
//! index and query but carry no normalization guarantee across queries.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::models::{Collection, ScoredDoc};

/// One posting: a document (by collection position) and a term count.
#[derive(Debug, Clone, Copy)]
struct Posting {
    doc: usize,
    count: u32,
}

/// Read-only inverted index over a collection's `text` fields.
#[derive(Debug)]
pub struct LexicalIndex {
    postings: HashMap<String, Vec<Posting>>,
    ids: Vec<String>,
    doc_lens: Vec<f64>,
}

impl LexicalIndex {
    /// Build the index from a collection.
    ///
    /// Fails if any document tokenizes to nothing (the indexed field is
    /// required, so a text with no indexable terms is malformed input).
    pub fn build(collection: &Collection) -> Result<Self> {
        let mut postings: HashMap<String, Vec<Posting>> = HashMap::new();
        let mut ids = Vec::with_capacity(collection.len());
        let mut doc_lens = Vec::with_capacity(collection.len());

        for (doc_pos, doc) in collection.docs().iter().enumerate() {
            let terms = tokenize(&doc.text);
            if terms.is_empty() {
                return Err(Error::MalformedDocument {
                    id: doc.id.clone(),
                    field: "text",
                });
            }

            let mut counts: HashMap<String, u32> = HashMap::new();
            for term in &terms {
                *counts.entry(term.clone()).or_insert(0) += 1;
            }
            for (term, count) in counts {
                postings.entry(term).or_default().push(Posting {
                    doc: doc_pos,
                    count,
                });
            }

            ids.push(doc.id.clone());
            doc_lens.push(terms.len() as f64);
        }

        Ok(Self {
            postings,
            ids,
            doc_lens,
        })
    }

    /// Rank documents against `query`, returning at most `limit` results.
    ///
    /// A query that is empty after tokenization yields an empty result,
    /// not an error; so does a query matching no document. Unknown terms
    /// contribute nothing. Ties are broken by original collection order.
    pub fn search(&self, query: &str, limit: usize) -> Vec<ScoredDoc> {
        let terms = tokenize(query);
        if terms.is_empty() || limit == 0 {
            return Vec::new();
        }

        let n = self.ids.len() as f64;
        let mut scores: HashMap<usize, f64> = HashMap::new();

        for term in &terms {
            let Some(list) = self.postings.get(term) else {
                continue;
            };
            let idf = 1.0 + (n / list.len() as f64).ln();
            for p in list {
                let tf = f64::from(p.count) / self.doc_lens[p.doc];
                *scores.entry(p.doc).or_insert(0.0) += tf * idf;
            }
        }

        let mut ranked: Vec<(usize, f64)> = scores.into_iter().collect();
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        ranked.truncate(limit);

        ranked
            .into_iter()
            .map(|(doc, score)| ScoredDoc::new(self.ids[doc].clone(), score))
            .collect()
    }

    /// Number of indexed documents.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Case-insensitive, punctuation-insensitive split into terms.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

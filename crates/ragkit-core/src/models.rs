//! Core data models used throughout ragkit.
//!
//! A [`Collection`] is loaded once per process run from a JSON array of
//! `{id, text, embedding?}` objects and held immutable for the lifetime of
//! the run. Every search path hands back [`ScoredDoc`]s whose ids are
//! guaranteed to resolve against the collection they were produced from.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A single retrievable chunk of source content.
///
/// The `embedding` is present only for documents intended for vector
/// search; lexical search ignores it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

/// An ordered, immutable set of [`Document`]s with O(1) id lookup.
#[derive(Debug, Clone)]
pub struct Collection {
    docs: Vec<Document>,
    by_id: HashMap<String, usize>,
}

impl Collection {
    /// Build a collection from an ordered document sequence.
    ///
    /// Fails on an empty id, a duplicate id, or a document with empty text
    /// (a document missing the indexed field is an error, not a silent skip).
    pub fn new(docs: Vec<Document>) -> Result<Self> {
        let mut by_id = HashMap::with_capacity(docs.len());
        for (i, doc) in docs.iter().enumerate() {
            if doc.id.is_empty() {
                return Err(Error::MalformedDocument {
                    id: format!("#{i}"),
                    field: "id",
                });
            }
            if doc.text.is_empty() {
                return Err(Error::MalformedDocument {
                    id: doc.id.clone(),
                    field: "text",
                });
            }
            if by_id.insert(doc.id.clone(), i).is_some() {
                return Err(Error::InvalidCollection(format!(
                    "duplicate document id '{}'",
                    doc.id
                )));
            }
        }
        Ok(Self { docs, by_id })
    }

    /// Parse the on-disk collection form: a JSON array of
    /// `{id, text, embedding?}` objects.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let docs: Vec<Document> = serde_json::from_slice(bytes)
            .map_err(|e| Error::InvalidCollection(e.to_string()))?;
        Self::new(docs)
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Documents in original load order.
    pub fn docs(&self) -> &[Document] {
        &self.docs
    }

    pub fn get(&self, id: &str) -> Option<&Document> {
        self.by_id.get(id).map(|&i| &self.docs[i])
    }

    /// Position of `id` in the original order, used for stable tie-breaks.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.by_id.get(id).copied()
    }
}

/// One entry of a ranked result: a document reference plus its score.
///
/// Scores from different retrieval paths are not on comparable scales;
/// only ranks are commensurable across paths.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredDoc {
    pub id: String,
    pub score: f64,
}

impl ScoredDoc {
    pub fn new(id: impl Into<String>, score: f64) -> Self {
        Self {
            id: id.into(),
            score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str, text: &str) -> Document {
        Document {
            id: id.to_string(),
            text: text.to_string(),
            embedding: None,
        }
    }

    #[test]
    fn test_lookup_and_order() {
        let c = Collection::new(vec![doc("a", "alpha"), doc("b", "beta")]).unwrap();
        assert_eq!(c.len(), 2);
        assert_eq!(c.get("b").unwrap().text, "beta");
        assert_eq!(c.position("a"), Some(0));
        assert_eq!(c.position("b"), Some(1));
        assert!(c.get("c").is_none());
    }

    #[test]
    fn test_empty_text_rejected() {
        let err = Collection::new(vec![doc("a", "")]).unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedDocument { field: "text", .. }
        ));
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let err = Collection::new(vec![doc("a", "x"), doc("a", "y")]).unwrap_err();
        assert!(matches!(err, Error::InvalidCollection(_)));
    }

    #[test]
    fn test_from_json() {
        let json = br#"[
            {"id": "d1", "text": "first"},
            {"id": "d2", "text": "second", "embedding": [0.1, 0.2]}
        ]"#;
        let c = Collection::from_json(json).unwrap();
        assert_eq!(c.len(), 2);
        assert_eq!(c.get("d2").unwrap().embedding.as_ref().unwrap().len(), 2);
        assert!(c.get("d1").unwrap().embedding.is_none());
    }

    #[test]
    fn test_from_json_malformed() {
        assert!(Collection::from_json(b"{not json").is_err());
    }
}

//! Error taxonomy for the retrieval core.
//!
//! Search failures are per-query: a [`DimensionMismatch`](Error::DimensionMismatch)
//! or [`MalformedDocument`](Error::MalformedDocument) fails the query being
//! processed, not the loaded collection or index. Collaborator failures
//! (embedding, cross-encoder) surface as [`Collaborator`](Error::Collaborator)
//! so callers can decide whether a documented degradation applies.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A document is missing a field the operation requires.
    #[error("document '{id}' is missing required field '{field}'")]
    MalformedDocument { id: String, field: &'static str },

    /// Query and document embeddings have different lengths.
    #[error(
        "embedding dimension mismatch for document '{id}': query has {query} dims, document has {document}"
    )]
    DimensionMismatch {
        id: String,
        query: usize,
        document: usize,
    },

    /// A ranked result references an id absent from the collection.
    #[error("result references unknown document id '{0}'")]
    UnknownDocument(String),

    /// The collection source could not be parsed or violates an invariant.
    #[error("invalid collection: {0}")]
    InvalidCollection(String),

    /// An external collaborator (embedding or cross-encoder) failed.
    #[error("collaborator call failed: {0}")]
    Collaborator(String),
}

pub type Result<T> = std::result::Result<T, Error>;

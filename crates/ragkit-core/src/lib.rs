//! # ragkit core
//!
//! Pure retrieval logic for ragkit: data models, text chunking, lexical
//! (inverted-index) search, vector (cosine) search, rank fusion, and
//! cross-encoder reranking.
//!
//! This crate performs no I/O. The calling application is responsible for
//! loading collections, embedding query text, and providing a
//! [`CrossEncoder`](rerank::CrossEncoder) implementation; the two external
//! calls (embedding, reranking) are the only suspension points in the
//! pipeline.

pub mod chunk;
pub mod error;
pub mod fusion;
pub mod lexical;
pub mod models;
pub mod pipeline;
pub mod rerank;
pub mod vector;

pub use error::{Error, Result};

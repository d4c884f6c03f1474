//! # ragkit
//!
//! A local-first retrieval-augmented generation toolkit.
//!
//! ragkit ingests a directory of documents into a JSON collection of
//! chunks, indexes them for lexical and vector retrieval, and layers
//! completion workflows on top: hybrid search, grounded question
//! answering, chat, and function calling. The retrieval algorithms live
//! in the [`ragkit_core`] crate; this crate is the glue — configuration,
//! HTTP collaborators, and the `rk` CLI.
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────┐   ┌──────────────┐   ┌──────────────────┐
//! │  docs/   │──▶│ Chunk+Embed  │──▶│ collection.json  │
//! └──────────┘   └──────────────┘   └────────┬─────────┘
//!                                            │
//!                        ┌───────────────────┤
//!                        ▼                   ▼
//!                 ┌────────────┐      ┌────────────┐
//!                 │  Lexical   │      │   Vector   │
//!                 │   index    │      │   cosine   │
//!                 └─────┬──────┘      └─────┬──────┘
//!                       └─── fusion ────────┘
//!                              │
//!                        (rerank, then)
//!                              ▼
//!                      context block / answer
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! rk ingest                             # chunk + embed docs/ into the collection
//! rk search "digger bees" --mode hybrid
//! rk ask "where do digger bees live?"
//! rk chat "hello" --stream
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`context`] | Loaded collection, index, and clients |
//! | [`ingest`] | Scan, chunk, embed, write the collection |
//! | [`search`] | Keyword, vector, and hybrid search |
//! | [`ask`] | Retrieval-augmented question answering |
//! | [`chat`] | Plain and streamed completions |
//! | [`tools`] | Function calling round trip |
//! | [`provider`] | Completion backend client |
//! | [`embedding`] | Embedding provider abstraction |
//! | [`reranker`] | HTTP cross-encoder client |

pub mod ask;
pub mod chat;
pub mod config;
pub mod context;
pub mod embedding;
pub mod get;
pub mod ingest;
pub mod provider;
pub mod reranker;
pub mod search;
pub mod tools;

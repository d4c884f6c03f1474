//! Explicit application context.
//!
//! Everything a retrieval command needs — the loaded collection, the
//! lexical index built over it, the completion client, and the optional
//! reranker — is constructed once here and passed into command runners.
//! Construction-time failures (bad credentials, missing collection file)
//! surface immediately and are distinct from per-query failures.

use anyhow::{Context as _, Result};

use ragkit_core::lexical::LexicalIndex;
use ragkit_core::models::Collection;
use ragkit_core::rerank::CrossEncoder;

use crate::config::Config;
use crate::provider::ChatClient;
use crate::reranker::create_reranker;

pub struct AppContext {
    pub config: Config,
    pub collection: Collection,
    pub index: LexicalIndex,
    pub chat: ChatClient,
    pub reranker: Option<Box<dyn CrossEncoder>>,
}

impl AppContext {
    /// Load the collection, build the index, and construct the clients.
    pub fn load(config: Config) -> Result<Self> {
        let path = &config.collection.path;
        let bytes = std::fs::read(path).with_context(|| {
            format!(
                "Failed to read collection file: {} (run `rk ingest` first?)",
                path.display()
            )
        })?;
        let collection = Collection::from_json(&bytes)
            .with_context(|| format!("Failed to load collection: {}", path.display()))?;
        let index = LexicalIndex::build(&collection).context("Failed to build lexical index")?;

        let chat = ChatClient::from_config(&config.provider)?;
        let reranker = create_reranker(&config.reranker)?;

        Ok(Self {
            config,
            collection,
            index,
            chat,
            reranker,
        })
    }
}

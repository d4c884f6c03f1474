//! The `rk search` command: keyword, vector, or hybrid retrieval.

use anyhow::{bail, Result};
use clap::ValueEnum;

use ragkit_core::models::ScoredDoc;
use ragkit_core::pipeline::{hybrid_search, FusionStrategy, RetrievalParams};
use ragkit_core::rerank::CrossEncoder;
use ragkit_core::vector::vector_search;

use crate::config::{Config, RetrievalConfig};
use crate::context::AppContext;
use crate::embedding::embed_query;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SearchMode {
    /// Lexical inverted-index search only.
    Keyword,
    /// Embedding cosine-similarity search only.
    Vector,
    /// Both paths, fused (and reranked when a reranker is configured).
    Hybrid,
}

/// Resolve the fusion strategy from config plus an optional CLI override.
pub fn fusion_strategy(retrieval: &RetrievalConfig, over: Option<&str>) -> Result<FusionStrategy> {
    let name = over.unwrap_or(&retrieval.fusion);
    match name {
        "rrf" => Ok(FusionStrategy::ReciprocalRank { k: retrieval.rrf_k }),
        "weighted" => Ok(FusionStrategy::WeightedSet {
            alpha: retrieval.alpha,
        }),
        other => bail!("Unknown fusion strategy: {other} (expected \"rrf\" or \"weighted\")"),
    }
}

pub fn retrieval_params(
    config: &Config,
    fusion_override: Option<&str>,
    limit_override: Option<usize>,
) -> Result<RetrievalParams> {
    Ok(RetrievalParams {
        strategy: fusion_strategy(&config.retrieval, fusion_override)?,
        limit: limit_override.unwrap_or(config.retrieval.final_limit),
    })
}

pub async fn run_search(
    ctx: &AppContext,
    query: &str,
    mode: SearchMode,
    fusion_override: Option<&str>,
    limit_override: Option<usize>,
    no_rerank: bool,
) -> Result<()> {
    let params = retrieval_params(&ctx.config, fusion_override, limit_override)?;

    let results = match mode {
        SearchMode::Keyword => ctx.index.search(query, params.limit),
        SearchMode::Vector => {
            let query_vec = require_query_embedding(ctx, query).await?;
            vector_search(&query_vec, &ctx.collection, params.limit)?
        }
        SearchMode::Hybrid => {
            let query_vec = require_query_embedding(ctx, query).await?;
            let encoder: Option<&dyn CrossEncoder> = if no_rerank {
                None
            } else {
                ctx.reranker.as_deref()
            };
            hybrid_search(
                &ctx.index,
                &ctx.collection,
                query,
                &query_vec,
                &params,
                encoder,
            )
            .await?
        }
    };

    print_results(ctx, &results);
    Ok(())
}

async fn require_query_embedding(ctx: &AppContext, query: &str) -> Result<Vec<f32>> {
    if !ctx.config.embedding.is_enabled() {
        bail!("Embedding provider is disabled; vector and hybrid search need one (try --mode keyword)");
    }
    embed_query(&ctx.config.embedding, query).await
}

fn print_results(ctx: &AppContext, results: &[ScoredDoc]) {
    if results.is_empty() {
        println!("No results.");
        return;
    }
    for (i, r) in results.iter().enumerate() {
        let text = ctx
            .collection
            .get(&r.id)
            .map(|d| d.text.as_str())
            .unwrap_or("");
        println!("{:>2}. {}  ({:.4})", i + 1, r.id, r.score);
        println!("    {}", snippet(text, 120));
    }
}

/// First line of the text, truncated at a char boundary.
fn snippet(text: &str, max_chars: usize) -> String {
    let line = text.lines().next().unwrap_or("");
    let mut out: String = line.chars().take(max_chars).collect();
    if line.chars().count() > max_chars {
        out.push('…');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fusion_strategy_from_config() {
        let retrieval = RetrievalConfig::default();
        assert_eq!(
            fusion_strategy(&retrieval, None).unwrap(),
            FusionStrategy::ReciprocalRank { k: 60.0 }
        );
        assert_eq!(
            fusion_strategy(&retrieval, Some("weighted")).unwrap(),
            FusionStrategy::WeightedSet { alpha: 0.5 }
        );
        assert!(fusion_strategy(&retrieval, Some("bm25")).is_err());
    }

    #[test]
    fn test_snippet_truncates_on_char_boundary() {
        assert_eq!(snippet("héllo wörld", 5), "héllo…");
        assert_eq!(snippet("short", 120), "short");
        assert_eq!(snippet("first line\nsecond", 120), "first line");
    }
}

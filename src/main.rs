//! # ragkit CLI (`rk`)
//!
//! The `rk` binary is the command-line interface to ragkit. It provides
//! commands for collection ingestion, search, grounded question answering,
//! chat, function calling, and document retrieval.
//!
//! ## Usage
//!
//! ```bash
//! rk --config ./config/ragkit.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `rk ingest` | Scan, chunk, and embed documents into the collection |
//! | `rk search "<query>"` | Search the collection (keyword, vector, or hybrid) |
//! | `rk ask "<question>"` | Answer a question grounded in retrieved sources |
//! | `rk chat "<prompt>"` | Talk to the completion model directly |
//! | `rk tools "<prompt>"` | Function-calling round trip |
//! | `rk get <id>` | Print a document by id |

mod ask;
mod chat;
mod config;
mod context;
mod embedding;
mod get;
mod ingest;
mod provider;
mod reranker;
mod search;
mod tools;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::context::AppContext;
use crate::search::SearchMode;

/// ragkit CLI — a local-first retrieval-augmented generation toolkit.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/ragkit.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "rk",
    about = "ragkit — a local-first retrieval-augmented generation toolkit",
    version,
    long_about = "ragkit ingests a directory of documents into a JSON collection of chunks, \
    indexes them for lexical and vector retrieval, and layers completion workflows on top: \
    hybrid search with rank fusion and reranking, grounded question answering, chat, and \
    function calling."
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/ragkit.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Ingest documents into the collection.
    ///
    /// Scans the configured docs directory, splits each file into
    /// paragraph-boundary chunks, embeds them when an embedding provider
    /// is configured, and writes the collection JSON.
    Ingest {
        /// Chunk and write the collection without calling the embedding API.
        #[arg(long)]
        skip_embeddings: bool,

        /// Show file and chunk counts without writing anything.
        #[arg(long)]
        dry_run: bool,
    },

    /// Search the collection.
    ///
    /// Vector and hybrid modes require an embedding provider; hybrid mode
    /// additionally applies the configured reranker unless --no-rerank.
    Search {
        /// The search query string.
        query: String,

        /// Search mode.
        #[arg(long, value_enum, default_value = "hybrid")]
        mode: SearchMode,

        /// Fusion strategy override: `rrf` or `weighted`.
        #[arg(long)]
        fusion: Option<String>,

        /// Maximum number of results to return.
        #[arg(long)]
        limit: Option<usize>,

        /// Skip the reranker even when one is configured.
        #[arg(long)]
        no_rerank: bool,
    },

    /// Answer a question grounded in retrieved sources.
    ///
    /// Retrieves the most relevant chunks, packs them into a context
    /// block, and asks the completion model to answer from those sources
    /// only, citing chunk ids.
    Ask {
        /// The question to answer.
        question: String,

        /// Rewrite the question into a search query before retrieving.
        #[arg(long)]
        rewrite: bool,

        /// Keep the session open for follow-up questions.
        #[arg(long)]
        interactive: bool,
    },

    /// Talk to the completion model directly (no retrieval).
    Chat {
        /// The prompt to send. Optional with --interactive.
        prompt: Option<String>,

        /// Override the system prompt.
        #[arg(long)]
        system: Option<String>,

        /// Stream the response token by token.
        #[arg(long)]
        stream: bool,

        /// Keep the session open for follow-up turns.
        #[arg(long)]
        interactive: bool,

        /// Constrain the reply to a JSON schema (structured output).
        /// The file holds the schema; its stem becomes the schema name.
        #[arg(long, value_name = "FILE")]
        json_schema: Option<PathBuf>,
    },

    /// Function-calling round trip.
    ///
    /// Advertises the built-in tools to the completion model, executes
    /// any calls it makes, and prints the final answer.
    Tools {
        /// The prompt to send.
        prompt: String,
    },

    /// Print a document by id.
    Get {
        /// Chunk id, e.g. `bees.md-1`.
        id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = config::load_config(&cli.config)?;

    // Ingest runs before a collection exists, so it takes the raw config.
    if let Commands::Ingest {
        skip_embeddings,
        dry_run,
    } = &cli.command
    {
        return ingest::run_ingest(&config, *skip_embeddings, *dry_run).await;
    }

    let ctx = AppContext::load(config)?;
    match cli.command {
        Commands::Ingest { .. } => unreachable!("handled above"),
        Commands::Search {
            query,
            mode,
            fusion,
            limit,
            no_rerank,
        } => search::run_search(&ctx, &query, mode, fusion.as_deref(), limit, no_rerank).await,
        Commands::Ask {
            question,
            rewrite,
            interactive,
        } => ask::run_ask(&ctx, &question, rewrite, interactive).await,
        Commands::Chat {
            prompt,
            system,
            stream,
            interactive,
            json_schema,
        } => {
            chat::run_chat(
                &ctx,
                prompt.as_deref(),
                system.as_deref(),
                stream,
                interactive,
                json_schema.as_deref(),
            )
            .await
        }
        Commands::Tools { prompt } => tools::run_tools(&ctx, &prompt).await,
        Commands::Get { id } => get::run_get(&ctx, &id),
    }
}

//! The `rk ask` command: retrieval-augmented question answering.
//!
//! Each question runs the retrieval pipeline, packs the top results into
//! an `id: text` context block, and asks the completion model to answer
//! from those sources only, citing ids. When the embedding provider is
//! disabled the command degrades to lexical-only retrieval and says so.

use anyhow::{anyhow, bail, Result};
use std::io::{BufRead, Write};

use ragkit_core::models::ScoredDoc;
use ragkit_core::pipeline::{build_context, hybrid_search};
use ragkit_core::rerank::CrossEncoder;

use crate::context::AppContext;
use crate::embedding::embed_query;
use crate::provider::{ChatMessage, ChatOptions, ChatOutcome};
use crate::search::retrieval_params;

const GROUNDING_PROMPT: &str = "You are a helpful assistant that answers questions using only \
the provided sources. Each source is one line of the form `id: text`. Answer concisely and cite \
the id of every source you use in square brackets, like [bees.md-1]. If the sources do not \
contain the answer, say so.";

const REWRITE_PROMPT: &str = "Rewrite the user's question as a short search query that will \
match relevant documents. Reply with the query text only, no quotes, no explanation.";

pub async fn run_ask(ctx: &AppContext, question: &str, rewrite: bool, interactive: bool) -> Result<()> {
    let mut history: Vec<ChatMessage> = vec![ChatMessage::system(GROUNDING_PROMPT)];

    answer_one(ctx, &mut history, question, rewrite).await?;

    if interactive {
        let stdin = std::io::stdin();
        loop {
            print!("\nask> ");
            std::io::stdout().flush()?;
            let mut line = String::new();
            if stdin.lock().read_line(&mut line)? == 0 {
                break;
            }
            let question = line.trim();
            if question.is_empty() || question == "exit" || question == "quit" {
                break;
            }
            answer_one(ctx, &mut history, question, rewrite).await?;
        }
    }
    Ok(())
}

async fn answer_one(
    ctx: &AppContext,
    history: &mut Vec<ChatMessage>,
    question: &str,
    rewrite: bool,
) -> Result<()> {
    let search_query = if rewrite {
        let rewritten = rewrite_query(ctx, question).await?;
        println!("[search query: {rewritten}]");
        rewritten
    } else {
        question.to_string()
    };

    let results = retrieve(ctx, &search_query).await?;
    if results.is_empty() {
        println!("No sources matched; answering without retrieval context.");
    }
    let sources = build_context(&ctx.collection, &results, results.len())?;

    history.push(ChatMessage::user(format!(
        "Sources:\n{sources}\n\nQuestion: {question}"
    )));

    let outcome = ctx.chat.complete(history, &ctx.chat.default_options()).await?;
    let answer = match outcome {
        ChatOutcome::Text(text) => text,
        ChatOutcome::ToolCalls(_) => bail!("Completion model returned tool calls unexpectedly"),
    };
    println!("{answer}");
    history.push(ChatMessage::assistant(answer));
    Ok(())
}

/// Hybrid retrieval, or lexical-only when no embedding provider is configured.
async fn retrieve(ctx: &AppContext, query: &str) -> Result<Vec<ScoredDoc>> {
    let params = retrieval_params(&ctx.config, None, None)?;
    if !ctx.config.embedding.is_enabled() {
        println!("[embedding disabled; using keyword retrieval only]");
        return Ok(ctx.index.search(query, params.limit));
    }
    let query_vec = embed_query(&ctx.config.embedding, query).await?;
    let encoder: Option<&dyn CrossEncoder> = ctx.reranker.as_deref();
    Ok(hybrid_search(
        &ctx.index,
        &ctx.collection,
        query,
        &query_vec,
        &params,
        encoder,
    )
    .await?)
}

async fn rewrite_query(ctx: &AppContext, question: &str) -> Result<String> {
    let messages = vec![
        ChatMessage::system(REWRITE_PROMPT),
        ChatMessage::user(question),
    ];
    let options = rewrite_options(ctx.chat.default_options());
    match ctx.chat.complete(&messages, &options).await? {
        ChatOutcome::Text(text) => {
            let trimmed = text.trim().to_string();
            if trimmed.is_empty() {
                Err(anyhow!("Query rewrite returned empty text"))
            } else {
                Ok(trimmed)
            }
        }
        ChatOutcome::ToolCalls(_) => Err(anyhow!("Query rewrite returned tool calls")),
    }
}

/// Decoding constraints for the rewrite call: a rewritten query is one
/// short line, so cap the length and stop at the first newline. The
/// temperature is lowered only when one is configured at all (a backend
/// that rejects the parameter keeps it unset).
fn rewrite_options(base: ChatOptions) -> ChatOptions {
    ChatOptions {
        temperature: base.temperature.map(|t| t.min(0.2)),
        max_tokens: Some(60),
        stop: Some(vec!["\n".to_string()]),
        ..base
    }
}

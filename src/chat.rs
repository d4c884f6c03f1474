//! The `rk chat` command: plain completions, optionally multi-turn,
//! optionally streamed, optionally schema-constrained.
//!
//! `--json-schema <file>` turns on structured output: the schema is sent
//! as a strict `response_format` and the reply is parsed as JSON before
//! printing, so a malformed reply fails loudly instead of passing through.

use anyhow::{bail, Context, Result};
use futures::StreamExt;
use std::io::{BufRead, Write};
use std::path::Path;

use crate::context::AppContext;
use crate::provider::{ChatMessage, ChatOptions, ChatOutcome};

const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

pub async fn run_chat(
    ctx: &AppContext,
    prompt: Option<&str>,
    system: Option<&str>,
    stream: bool,
    interactive: bool,
    json_schema: Option<&Path>,
) -> Result<()> {
    let mut history = vec![ChatMessage::system(
        system.unwrap_or(DEFAULT_SYSTEM_PROMPT),
    )];

    let mut options = ctx.chat.default_options();
    if let Some(path) = json_schema {
        options.response_format = Some(load_response_format(path)?);
    }

    if let Some(prompt) = prompt {
        send_turn(ctx, &mut history, prompt, stream, &options).await?;
    } else if !interactive {
        bail!("rk chat needs a prompt (or --interactive)");
    }

    if interactive {
        let stdin = std::io::stdin();
        loop {
            print!("\nchat> ");
            std::io::stdout().flush()?;
            let mut line = String::new();
            if stdin.lock().read_line(&mut line)? == 0 {
                break;
            }
            let prompt = line.trim();
            if prompt.is_empty() || prompt == "exit" || prompt == "quit" {
                break;
            }
            send_turn(ctx, &mut history, prompt, stream, &options).await?;
        }
    }
    Ok(())
}

async fn send_turn(
    ctx: &AppContext,
    history: &mut Vec<ChatMessage>,
    prompt: &str,
    stream: bool,
    options: &ChatOptions,
) -> Result<()> {
    history.push(ChatMessage::user(prompt));

    let reply = if stream {
        let mut fragments = ctx.chat.complete_stream(history, options).await?;
        let mut full = String::new();
        while let Some(fragment) = fragments.next().await {
            let fragment = fragment?;
            print!("{fragment}");
            std::io::stdout().flush()?;
            full.push_str(&fragment);
        }
        println!();
        full
    } else {
        match ctx.chat.complete(history, options).await? {
            ChatOutcome::Text(text) => {
                if options.response_format.is_some() {
                    print_structured(&text)?;
                } else {
                    println!("{text}");
                }
                text
            }
            ChatOutcome::ToolCalls(_) => {
                bail!("Completion model returned tool calls unexpectedly")
            }
        }
    };

    history.push(ChatMessage::assistant(reply));
    Ok(())
}

/// Read a JSON schema file and wrap it in the strict `response_format`
/// envelope the completions API expects. The schema name is the file stem.
fn load_response_format(path: &Path) -> Result<serde_json::Value> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read schema file: {}", path.display()))?;
    let schema: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse schema file: {}", path.display()))?;
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("response");
    Ok(response_format_from_schema(name, schema))
}

fn response_format_from_schema(name: &str, schema: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "type": "json_schema",
        "json_schema": {
            "name": name,
            "strict": true,
            "schema": schema,
        }
    })
}

/// A schema-constrained reply must be valid JSON; re-serialize it pretty.
fn print_structured(text: &str) -> Result<()> {
    let value: serde_json::Value = serde_json::from_str(text)
        .with_context(|| format!("Model reply is not valid JSON: {text}"))?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

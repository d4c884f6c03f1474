//! The `rk tools` command: function calling against the completion model.
//!
//! Advertises a `lookup_weather` function, lets the model decide whether to
//! call it, executes the call locally, and feeds the result back for the
//! final answer. The weather lookup itself is canned data; the point is the
//! call/dispatch/answer round trip.

use anyhow::{bail, Result};
use serde::Deserialize;

use crate::context::AppContext;
use crate::provider::{ChatMessage, ChatOptions, ChatOutcome, ToolCall};

pub async fn run_tools(ctx: &AppContext, prompt: &str) -> Result<()> {
    let mut messages = vec![
        ChatMessage::system("You are a helpful assistant. Use the provided tools when they apply."),
        ChatMessage::user(prompt),
    ];

    let options = ChatOptions {
        tools: Some(tool_definitions()),
        ..ctx.chat.default_options()
    };

    match ctx.chat.complete(&messages, &options).await? {
        ChatOutcome::Text(text) => {
            // Model answered directly without calling a tool.
            println!("{text}");
        }
        ChatOutcome::ToolCalls(calls) => {
            messages.push(ChatMessage::assistant_tool_calls(calls.clone()));
            for call in &calls {
                let result = dispatch(call)?;
                println!("[{} -> {}]", call.function.name, result);
                messages.push(ChatMessage::tool_result(call.id.clone(), result));
            }

            match ctx.chat.complete(&messages, &ctx.chat.default_options()).await? {
                ChatOutcome::Text(text) => println!("{text}"),
                ChatOutcome::ToolCalls(_) => {
                    bail!("Completion model requested tools again after tool results")
                }
            }
        }
    }
    Ok(())
}

fn tool_definitions() -> serde_json::Value {
    serde_json::json!([{
        "type": "function",
        "function": {
            "name": "lookup_weather",
            "description": "Look up the current weather for a location.",
            "parameters": {
                "type": "object",
                "properties": {
                    "city_name": {
                        "type": "string",
                        "description": "City name"
                    },
                    "zip_code": {
                        "type": "string",
                        "description": "Postal code"
                    }
                },
                "additionalProperties": false
            }
        }
    }])
}

#[derive(Debug, Deserialize)]
struct WeatherArgs {
    city_name: Option<String>,
    zip_code: Option<String>,
}

fn dispatch(call: &ToolCall) -> Result<String> {
    match call.function.name.as_str() {
        "lookup_weather" => {
            let args: WeatherArgs = serde_json::from_str(&call.function.arguments)?;
            Ok(lookup_weather(args))
        }
        other => bail!("Completion model called unknown tool: {other}"),
    }
}

fn lookup_weather(args: WeatherArgs) -> String {
    let place = args
        .city_name
        .or(args.zip_code)
        .unwrap_or_else(|| "unknown location".to_string());
    format!("Weather in {place}: 22°C, partly cloudy, light breeze")
}

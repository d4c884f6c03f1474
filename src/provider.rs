//! Completion provider: one client, four interchangeable backends.
//!
//! Every command talks to the chat-completion API through a single
//! [`ChatClient`] built once from `[provider]` config — there is no
//! per-call-site backend branching. All four backends speak the
//! OpenAI-compatible chat-completions wire shape and differ only in URL
//! layout and credential header:
//!
//! | Backend | URL | Credential |
//! |---------|-----|------------|
//! | `cloud-managed` | `{base_url}/openai/deployments/{model}/chat/completions?api-version=…` | `api-key` header, `AZURE_OPENAI_API_KEY` |
//! | `self-hosted-gateway` | `{base_url}/chat/completions` | bearer, `GATEWAY_TOKEN` or `GITHUB_TOKEN` |
//! | `local-inference` | `{base_url}/chat/completions` | none |
//! | `direct-vendor` | `https://api.openai.com/v1/chat/completions` | bearer, `OPENAI_API_KEY` |
//!
//! Options the caller leaves unset are not sent — backends that reject a
//! parameter (reasoning models and temperature, say) simply never see it.

use anyhow::{anyhow, bail, Result};
use futures::stream::BoxStream;
use futures::StreamExt;
use reqwest_eventsource::{Event, EventSource};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::{Backend, ProviderConfig};

/// One role-tagged turn of a conversation.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self::plain("system", content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::plain("user", content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::plain("assistant", content)
    }

    /// An assistant turn carrying tool invocations instead of text.
    pub fn assistant_tool_calls(calls: Vec<ToolCall>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: None,
            tool_calls: Some(calls),
            tool_call_id: None,
        }
    }

    /// A tool-result turn answering the call with the given id.
    pub fn tool_result(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: "tool".to_string(),
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: Some(call_id.into()),
        }
    }

    fn plain(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }
}

/// A structured tool invocation returned by the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type")]
    pub call_type: String,
    pub function: FunctionCall,
}

/// Tool name plus JSON-encoded arguments; the caller parses and
/// dispatches the arguments itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    pub arguments: String,
}

/// Per-call sampling and capability options. Unset fields are omitted
/// from the request entirely.
#[derive(Debug, Clone, Default)]
pub struct ChatOptions {
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    pub stop: Option<Vec<String>>,
    pub tools: Option<serde_json::Value>,
    pub response_format: Option<serde_json::Value>,
}

/// What a completion call produced.
#[derive(Debug, Clone)]
pub enum ChatOutcome {
    Text(String),
    ToolCalls(Vec<ToolCall>),
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ToolCall>>,
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: Delta,
}

#[derive(Debug, Deserialize, Default)]
struct Delta {
    #[serde(default)]
    content: Option<String>,
}

/// Chat-completion client, constructed once per process from config.
pub struct ChatClient {
    http: reqwest::Client,
    url: String,
    auth: Auth,
    model: String,
    /// Default temperature applied when a call does not set its own.
    default_temperature: Option<f64>,
}

enum Auth {
    ApiKeyHeader(String),
    Bearer(String),
    None,
}

impl ChatClient {
    /// Build the client for the configured backend. Fails here — not per
    /// query — on a missing credential or base URL.
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        let (url, auth) = match config.backend {
            Backend::CloudManaged => {
                let endpoint = config
                    .base_url
                    .as_deref()
                    .ok_or_else(|| anyhow!("provider.base_url required for cloud-managed"))?;
                let api_version = config
                    .api_version
                    .as_deref()
                    .ok_or_else(|| anyhow!("provider.api_version required for cloud-managed"))?;
                let key = std::env::var("AZURE_OPENAI_API_KEY")
                    .map_err(|_| anyhow!("AZURE_OPENAI_API_KEY not set"))?;
                (
                    format!(
                        "{}/openai/deployments/{}/chat/completions?api-version={}",
                        endpoint.trim_end_matches('/'),
                        config.model,
                        api_version
                    ),
                    Auth::ApiKeyHeader(key),
                )
            }
            Backend::SelfHostedGateway => {
                let base = config
                    .base_url
                    .as_deref()
                    .ok_or_else(|| anyhow!("provider.base_url required for self-hosted-gateway"))?;
                let token = std::env::var("GATEWAY_TOKEN")
                    .or_else(|_| std::env::var("GITHUB_TOKEN"))
                    .map_err(|_| anyhow!("GATEWAY_TOKEN (or GITHUB_TOKEN) not set"))?;
                (
                    format!("{}/chat/completions", base.trim_end_matches('/')),
                    Auth::Bearer(token),
                )
            }
            Backend::LocalInference => {
                let base = config
                    .base_url
                    .as_deref()
                    .ok_or_else(|| anyhow!("provider.base_url required for local-inference"))?;
                (
                    format!("{}/chat/completions", base.trim_end_matches('/')),
                    Auth::None,
                )
            }
            Backend::DirectVendor => {
                let key = std::env::var("OPENAI_API_KEY")
                    .map_err(|_| anyhow!("OPENAI_API_KEY not set"))?;
                let base = config
                    .base_url
                    .as_deref()
                    .unwrap_or("https://api.openai.com/v1");
                (
                    format!("{}/chat/completions", base.trim_end_matches('/')),
                    Auth::Bearer(key),
                )
            }
        };

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            url,
            auth,
            model: config.model.clone(),
            default_temperature: config.temperature,
        })
    }

    /// Default options carrying the configured temperature.
    pub fn default_options(&self) -> ChatOptions {
        ChatOptions {
            temperature: self.default_temperature,
            ..ChatOptions::default()
        }
    }

    /// Single request/response completion.
    pub async fn complete(
        &self,
        messages: &[ChatMessage],
        options: &ChatOptions,
    ) -> Result<ChatOutcome> {
        let body = request_body(&self.model, messages, options, false);
        let response = self.authorize(self.http.post(&self.url)).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            bail!("Completion API error {}: {}", status, body_text);
        }

        let parsed: ChatResponse = response.json().await?;
        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("Completion response had no choices"))?;

        match choice.message.tool_calls {
            Some(calls) if !calls.is_empty() => Ok(ChatOutcome::ToolCalls(calls)),
            _ => Ok(ChatOutcome::Text(choice.message.content.unwrap_or_default())),
        }
    }

    /// Streaming completion: yields text fragments as they arrive.
    pub async fn complete_stream(
        &self,
        messages: &[ChatMessage],
        options: &ChatOptions,
    ) -> Result<BoxStream<'static, Result<String>>> {
        let body = request_body(&self.model, messages, options, true);
        let builder = self.authorize(self.http.post(&self.url)).json(&body);
        let mut source = EventSource::new(builder)?;

        let stream = async_stream::try_stream! {
            while let Some(event) = source.next().await {
                match event {
                    Ok(Event::Open) => {}
                    Ok(Event::Message(message)) => {
                        if message.data == "[DONE]" {
                            break;
                        }
                        let chunk: StreamChunk = serde_json::from_str(&message.data)?;
                        if let Some(choice) = chunk.choices.into_iter().next() {
                            if let Some(content) = choice.delta.content {
                                if !content.is_empty() {
                                    yield content;
                                }
                            }
                        }
                    }
                    Err(reqwest_eventsource::Error::StreamEnded) => break,
                    Err(e) => {
                        source.close();
                        Err(anyhow!("Completion stream error: {}", e))?;
                    }
                }
            }
        };

        Ok(stream.boxed())
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth {
            Auth::ApiKeyHeader(key) => builder.header("api-key", key),
            Auth::Bearer(token) => builder.header("Authorization", format!("Bearer {token}")),
            Auth::None => builder,
        }
    }
}

/// Build the request JSON, sending only the options the caller set.
fn request_body(
    model: &str,
    messages: &[ChatMessage],
    options: &ChatOptions,
    stream: bool,
) -> serde_json::Value {
    let mut body = serde_json::json!({
        "model": model,
        "messages": messages,
    });
    if stream {
        body["stream"] = serde_json::Value::Bool(true);
    }
    if let Some(t) = options.temperature {
        body["temperature"] = serde_json::json!(t);
    }
    if let Some(m) = options.max_tokens {
        body["max_tokens"] = serde_json::json!(m);
    }
    if let Some(stop) = &options.stop {
        body["stop"] = serde_json::json!(stop);
    }
    if let Some(tools) = &options.tools {
        body["tools"] = tools.clone();
    }
    if let Some(format) = &options.response_format {
        body["response_format"] = format.clone();
    }
    body
}

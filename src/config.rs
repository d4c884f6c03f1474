//! TOML configuration parsing.
//!
//! Everything the CLI needs — collection location, ingest globs, chunking
//! budget, completion backend, embedding provider, reranker, and retrieval
//! tuning — is read once from a single TOML file. Per-query flags may
//! override individual retrieval settings, but no backend selection ever
//! happens at a call site.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub collection: CollectionConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    pub provider: ProviderConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub reranker: RerankerConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CollectionConfig {
    /// Path of the ingested-collection JSON (array of `{id, text, embedding?}`).
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct IngestConfig {
    /// Directory scanned by `rk ingest`.
    #[serde(default = "default_docs_dir")]
    pub docs_dir: PathBuf,
    #[serde(default = "default_include_globs")]
    pub include_globs: Vec<String>,
    #[serde(default)]
    pub exclude_globs: Vec<String>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            docs_dir: default_docs_dir(),
            include_globs: default_include_globs(),
            exclude_globs: Vec::new(),
        }
    }
}

fn default_docs_dir() -> PathBuf {
    PathBuf::from("docs")
}

fn default_include_globs() -> Vec<String> {
    vec!["**/*.md".to_string(), "**/*.txt".to_string()]
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChunkingConfig {
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_tokens: default_max_tokens(),
        }
    }
}

fn default_max_tokens() -> usize {
    500
}

/// Completion backend, selected once at startup.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Backend {
    /// Managed cloud deployment: `base_url` endpoint + `api_version`,
    /// `api-key` header from `AZURE_OPENAI_API_KEY`.
    CloudManaged,
    /// Self-hosted OpenAI-compatible gateway / model marketplace:
    /// `base_url` + bearer token from `GATEWAY_TOKEN` (or `GITHUB_TOKEN`).
    SelfHostedGateway,
    /// Local inference server (Ollama-style): `base_url`, no credential.
    LocalInference,
    /// api.openai.com with `OPENAI_API_KEY`.
    DirectVendor,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    pub backend: Backend,
    /// Model name, or deployment name for the cloud-managed backend.
    pub model: String,
    /// Endpoint base URL; required for every backend except direct-vendor.
    #[serde(default)]
    pub base_url: Option<String>,
    /// API version query parameter (cloud-managed backend only).
    #[serde(default)]
    pub api_version: Option<String>,
    /// Default sampling temperature; individual commands may override or
    /// leave it unset for backends that reject it.
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    /// `"openai"` (OpenAI-compatible endpoint) or `"disabled"`.
    #[serde(default = "default_disabled")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub dims: Option<usize>,
    /// Endpoint override; defaults to `https://api.openai.com/v1`.
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_disabled(),
            model: None,
            dims: None,
            base_url: None,
            batch_size: default_batch_size(),
            max_retries: default_max_retries(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl EmbeddingConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RerankerConfig {
    /// `"http"` (cross-encoder rerank endpoint) or `"disabled"`.
    #[serde(default = "default_disabled")]
    pub provider: String,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RerankerConfig {
    fn default() -> Self {
        Self {
            provider: default_disabled(),
            base_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    /// `"rrf"` or `"weighted"`.
    #[serde(default = "default_fusion")]
    pub fusion: String,
    #[serde(default = "default_rrf_k")]
    pub rrf_k: f64,
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    #[serde(default = "default_final_limit")]
    pub final_limit: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            fusion: default_fusion(),
            rrf_k: default_rrf_k(),
            alpha: default_alpha(),
            final_limit: default_final_limit(),
        }
    }
}

fn default_disabled() -> String {
    "disabled".to_string()
}
fn default_fusion() -> String {
    "rrf".to_string()
}
fn default_rrf_k() -> f64 {
    60.0
}
fn default_alpha() -> f64 {
    0.5
}
fn default_final_limit() -> usize {
    5
}
fn default_batch_size() -> usize {
    64
}
fn default_max_retries() -> u32 {
    5
}
fn default_timeout_secs() -> u64 {
    30
}

/// Load and parse the config file.
pub fn load_config(path: &Path) -> Result<Config> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: Config = toml::from_str(&raw)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    Ok(config)
}

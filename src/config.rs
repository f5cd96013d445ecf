//! TOML configuration.
//!
//! Every section is optional; the defaults reproduce the stock setup (the
//! `SS123` collection under `documents/`, `gpt-3.5-turbo`, five passages per
//! question). The model credential is never stored in the file: the file
//! names the environment variable, and [`Config::api_key`] reads it once when
//! the composition root builds the chat client.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Name of the SQLite file inside a collection directory.
pub const COLLECTION_FILE: &str = "collection.sqlite3";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub collection: CollectionConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CollectionConfig {
    #[serde(default = "default_collection_path")]
    pub path: PathBuf,
    #[serde(default = "default_collection_name")]
    pub name: String,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            path: default_collection_path(),
            name: default_collection_name(),
        }
    }
}

impl CollectionConfig {
    /// Full path of the collection's SQLite file.
    pub fn db_file(&self) -> PathBuf {
        self.path.join(COLLECTION_FILE)
    }
}

fn default_collection_path() -> PathBuf {
    PathBuf::from("documents/SS123")
}
fn default_collection_name() -> String {
    "SS123".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    #[serde(default = "default_n_results")]
    pub n_results: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            n_results: default_n_results(),
        }
    }
}

fn default_n_results() -> usize {
    5
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub dims: Option<usize>,
    #[serde(default)]
    pub url: Option<String>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            dims: None,
            url: None,
        }
    }
}

fn default_provider() -> String {
    "local".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_llm_model(),
            base_url: default_llm_base_url(),
            api_key_env: default_api_key_env(),
        }
    }
}

fn default_llm_model() -> String {
    "gpt-3.5-turbo".to_string()
}
fn default_llm_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}
fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8501".to_string()
}

/// Form settings for the web page.
#[derive(Debug, Deserialize, Clone)]
pub struct UiConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_question")]
    pub default_question: String,
    /// Upper bound on question length, in characters.
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
    /// Height hint for the question input, in pixels.
    #[serde(default = "default_height")]
    pub height: u32,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            default_question: default_question(),
            max_chars: default_max_chars(),
            height: default_height(),
        }
    }
}

fn default_title() -> String {
    "Chat With Your Document".to_string()
}
fn default_question() -> String {
    "What is the summary of this document?".to_string()
}
fn default_max_chars() -> usize {
    8000
}
fn default_height() -> u32 {
    30
}

impl Config {
    /// Read the model credential from the environment variable named by
    /// `llm.api_key_env`. Empty values count as unset.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.llm.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

/// Load and validate a configuration file.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config = parse_config(&content)?;
    validate(&config)?;
    Ok(config)
}

/// Load the file when one is given, otherwise fall back to the defaults.
pub fn load_or_default(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => load_config(path),
        None => Ok(Config::default()),
    }
}

fn parse_config(content: &str) -> Result<Config> {
    toml::from_str(content).with_context(|| "Failed to parse config file")
}

fn validate(config: &Config) -> Result<()> {
    if config.collection.name.trim().is_empty() {
        anyhow::bail!("collection.name must not be empty");
    }

    if config.retrieval.n_results < 1 {
        anyhow::bail!("retrieval.n_results must be >= 1");
    }

    if config.llm.model.trim().is_empty() {
        anyhow::bail!("llm.model must not be empty");
    }

    if config.ui.max_chars < 1 {
        anyhow::bail!("ui.max_chars must be >= 1");
    }

    match config.embedding.provider.as_str() {
        "local" | "openai" | "ollama" => {}
        other => anyhow::bail!(
            "Unknown embedding provider: '{}'. Must be local, openai, or ollama.",
            other
        ),
    }

    if config.embedding.provider == "openai" && config.embedding.model.is_none() {
        anyhow::bail!("embedding.model must be specified when provider is 'openai'");
    }

    if config.embedding.dims == Some(0) {
        anyhow::bail!("embedding.dims must be > 0");
    }

    Ok(())
}

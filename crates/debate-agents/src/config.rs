use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Generation endpoint configuration (OpenAI-compatible).
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    pub base_url: String,
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_max_tokens() -> u32 {
    1024
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: std::env::var("DEBATE_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".into()),
            model: std::env::var("DEBATE_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into()),
            api_key: std::env::var("OPENAI_API_KEY").ok(),
            timeout_secs: default_timeout_secs(),
            max_tokens: default_max_tokens(),
        }
    }
}

/// Top-level configuration for the debate runner.
#[derive(Debug, Clone, Deserialize)]
pub struct AgentsConfig {
    #[serde(default)]
    pub generation: GenerationConfig,
    /// Directory archives are written to.
    #[serde(default = "default_archive_dir")]
    pub archive_dir: PathBuf,
}

fn default_archive_dir() -> PathBuf {
    PathBuf::from("saved_debates")
}

impl Default for AgentsConfig {
    fn default() -> Self {
        Self {
            generation: GenerationConfig::default(),
            archive_dir: default_archive_dir(),
        }
    }
}

impl AgentsConfig {
    /// Load from a TOML file, falling back to env-derived defaults for
    /// anything the file omits.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
    }
}

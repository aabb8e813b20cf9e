use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use skillscout_skills::github::{
    FALLBACK_BRANCH, GITHUB_API_BASE, GITHUB_RAW_BASE, RemoteLoaderConfig,
};
use skillscout_skills::{EmbeddingBasis, SourceConfig};

pub const DEFAULT_SKILLS_REPO: &str = "https://github.com/K-Dense-AI/claude-scientific-skills";

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub skills: SkillsConfig,
    pub embedding: EmbeddingConfig,
    pub remote: RemoteConfig,
    pub server: ServerConfig,
}

fn default_sources() -> Vec<SourceConfig> {
    vec![SourceConfig::github(DEFAULT_SKILLS_REPO)]
}

fn default_watch_debounce_ms() -> u64 {
    500
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SkillsConfig {
    /// Cut skill content in search responses after this many characters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_content_chars: Option<usize>,
    #[serde(default)]
    pub embedding_basis: EmbeddingBasis,
    /// Rebuild the index when SKILL.md files under local sources change.
    #[serde(default)]
    pub watch: bool,
    #[serde(default = "default_watch_debounce_ms")]
    pub watch_debounce_ms: u64,
    /// Loaded in order; kept last so TOML output puts the table array after plain keys.
    #[serde(default = "default_sources")]
    pub sources: Vec<SourceConfig>,
}

impl Default for SkillsConfig {
    fn default() -> Self {
        Self {
            max_content_chars: None,
            embedding_basis: EmbeddingBasis::default(),
            watch: false,
            watch_debounce_ms: default_watch_debounce_ms(),
            sources: default_sources(),
        }
    }
}

impl SkillsConfig {
    #[must_use]
    pub fn watch_debounce(&self) -> Duration {
        Duration::from_millis(self.watch_debounce_ms)
    }
}

/// Embedding backend selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Ollama,
    #[serde(rename = "openai")]
    OpenAi,
}

impl ProviderKind {
    #[must_use]
    pub fn default_base_url(self) -> &'static str {
        match self {
            Self::Ollama => "http://localhost:11434",
            Self::OpenAi => "https://api.openai.com/v1",
        }
    }
}

fn default_embedding_model() -> String {
    "all-minilm".into()
}

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Clone, PartialEq, Deserialize, Serialize)]
pub struct EmbeddingConfig {
    #[serde(default)]
    pub provider: ProviderKind,
    /// Provider endpoint; the provider's default when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default = "default_embedding_model")]
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            base_url: None,
            model: default_embedding_model(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl EmbeddingConfig {
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.provider.default_base_url())
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl fmt::Debug for EmbeddingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddingConfig")
            .field("provider", &self.provider)
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

fn default_api_base() -> String {
    GITHUB_API_BASE.into()
}

fn default_raw_base() -> String {
    GITHUB_RAW_BASE.into()
}

fn default_fallback_branch() -> String {
    FALLBACK_BRANCH.into()
}

fn default_fetch_concurrency() -> usize {
    4
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RemoteConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_raw_base")]
    pub raw_base: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_fetch_concurrency")]
    pub fetch_concurrency: usize,
    #[serde(default = "default_fallback_branch")]
    pub fallback_branch: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            raw_base: default_raw_base(),
            timeout_secs: default_timeout_secs(),
            fetch_concurrency: default_fetch_concurrency(),
            fallback_branch: default_fallback_branch(),
        }
    }
}

impl RemoteConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    #[must_use]
    pub fn loader_config(&self) -> RemoteLoaderConfig {
        RemoteLoaderConfig {
            api_base: self.api_base.clone(),
            raw_base: self.raw_base.clone(),
            fallback_branch: self.fallback_branch.clone(),
            fetch_concurrency: self.fetch_concurrency,
        }
    }
}

fn default_top_k() -> usize {
    3
}

fn default_max_top_k() -> usize {
    20
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_top_k")]
    pub default_top_k: usize,
    #[serde(default = "default_max_top_k")]
    pub max_top_k: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            default_top_k: default_top_k(),
            max_top_k: default_max_top_k(),
        }
    }
}

mod env;
mod types;

#[cfg(test)]
mod tests;

pub use types::*;

use std::path::Path;

use anyhow::{Context, ensure};

const EXAMPLE_CONFIG: &str = r#"# skillscout configuration

[skills]
# Sources are loaded in order; skills with the same name are all kept.
sources = [
    { type = "github", url = "https://github.com/K-Dense-AI/claude-scientific-skills" },
    { type = "github", url = "https://github.com/anthropics/claude-cookbooks", subpath = "skills/custom_skills" },
    { type = "local", path = "~/.claude/skills" },
]
# Cut skill content in search results after this many characters.
# max_content_chars = 4000
# "description" or "description_and_content"
embedding_basis = "description"
# Rebuild the index when SKILL.md files under local sources change.
watch = false

[embedding]
# "ollama" or "openai"
provider = "ollama"
# base_url = "http://localhost:11434"
model = "all-minilm"
# api_key = "sk-..."

[remote]
timeout_secs = 30
fetch_concurrency = 4
fallback_branch = "master"

[server]
default_top_k = 3
max_top_k = 20
"#;

impl Config {
    /// Load configuration from a TOML or JSON file with env var overrides.
    ///
    /// Falls back to defaults when no path is given or the file does not exist.
    /// Files ending in `.json` are parsed as JSON, anything else as TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or if
    /// the resulting values are out of range.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) if path.exists() => {
                let content =
                    std::fs::read_to_string(path).context("failed to read config file")?;
                Self::parse(path, &content)?
            }
            Some(path) => {
                tracing::warn!(
                    "config file {} not found, using defaults",
                    path.display()
                );
                Self::default()
            }
            None => Self::default(),
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn parse(path: &Path, content: &str) -> anyhow::Result<Self> {
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            serde_json::from_str(content).context("failed to parse config file")
        } else {
            toml::from_str(content).context("failed to parse config file")
        }
    }

    /// Check value ranges that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid value.
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(self.server.max_top_k >= 1, "server.max_top_k must be at least 1");
        ensure!(
            (1..=self.server.max_top_k).contains(&self.server.default_top_k),
            "server.default_top_k must be between 1 and {}",
            self.server.max_top_k
        );
        ensure!(
            self.remote.fetch_concurrency >= 1,
            "remote.fetch_concurrency must be at least 1"
        );
        ensure!(
            self.skills.max_content_chars != Some(0),
            "skills.max_content_chars must be at least 1"
        );
        ensure!(
            !self.embedding.model.trim().is_empty(),
            "embedding.model must not be empty"
        );
        ensure!(
            self.embedding.timeout_secs >= 1,
            "embedding.timeout_secs must be at least 1"
        );
        ensure!(
            self.remote.timeout_secs >= 1,
            "remote.timeout_secs must be at least 1"
        );
        Ok(())
    }

    /// A commented example configuration file.
    #[must_use]
    pub fn example() -> &'static str {
        EXAMPLE_CONFIG
    }
}

//! Provider and ingestor construction from [`Config`].

use std::path::PathBuf;

use anyhow::bail;
use skillscout_llm::any::AnyProvider;
use skillscout_llm::http::client_with_timeout;
use skillscout_llm::ollama::OllamaProvider;
use skillscout_llm::openai::OpenAiProvider;
use skillscout_skills::SkillIngestor;
use skillscout_skills::github::{HttpFetcher, RemoteLoader};
use skillscout_skills::source::{SourceSpec, resolve_sources};

use crate::config::{Config, ProviderKind};

/// Build the embedding provider selected by `[embedding]`.
///
/// # Errors
///
/// Returns an error if the OpenAI provider points at the hosted API without an
/// API key.
pub fn create_provider(config: &Config) -> anyhow::Result<AnyProvider> {
    let embedding = &config.embedding;
    let base_url = embedding.base_url();

    match embedding.provider {
        ProviderKind::Ollama => Ok(AnyProvider::Ollama(OllamaProvider::new(
            base_url,
            embedding.model.clone(),
        ))),
        ProviderKind::OpenAi => {
            if embedding.api_key.is_none()
                && base_url.starts_with(ProviderKind::OpenAi.default_base_url())
            {
                bail!("embedding.api_key (or SKILLSCOUT_OPENAI_API_KEY) is required for {base_url}");
            }
            let provider = OpenAiProvider::new(
                embedding.api_key.clone(),
                base_url.to_owned(),
                embedding.model.clone(),
            )
            .with_client(client_with_timeout(embedding.timeout()));
            Ok(AnyProvider::OpenAi(provider))
        }
    }
}

/// Remote loader and ingestor configured by `[remote]`.
#[must_use]
pub fn create_ingestor(config: &Config) -> SkillIngestor<HttpFetcher> {
    let fetcher = HttpFetcher::new(config.remote.timeout());
    SkillIngestor::new(RemoteLoader::new(fetcher, config.remote.loader_config()))
}

/// Configured local source directories, for the SKILL.md watcher.
#[must_use]
pub fn local_directories(sources: &[SourceSpec]) -> Vec<PathBuf> {
    sources
        .iter()
        .filter_map(|spec| match spec {
            SourceSpec::Local(local) => Some(local.directory.clone()),
            SourceSpec::Remote(_) => None,
        })
        .collect()
}

/// Validated source list from `[skills].sources`.
#[must_use]
pub fn configured_sources(config: &Config) -> Vec<SourceSpec> {
    resolve_sources(&config.skills.sources)
}

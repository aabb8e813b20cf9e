use std::time::Duration;

use futures::StreamExt;
use serde::Deserialize;

use crate::error::FetchFailure;
use crate::local::SKILL_FILE_NAME;
use crate::source::{RawDocument, RemoteSource};

pub const GITHUB_API_BASE: &str = "https://api.github.com";
pub const GITHUB_RAW_BASE: &str = "https://raw.githubusercontent.com";
pub const FALLBACK_BRANCH: &str = "master";

/// Read-only GET used by the remote loader.
///
/// Any non-2xx status must come back as [`FetchFailure::Status`] so the loader
/// can tell a missing branch apart from other failures.
pub trait RemoteFetch: Send + Sync {
    fn get(&self, url: &str) -> impl Future<Output = Result<String, FetchFailure>> + Send;
}

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Fetcher whose every request is bounded by `timeout`.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: skillscout_llm::http::client_with_timeout(timeout),
        }
    }
}

impl RemoteFetch for HttpFetcher {
    async fn get(&self, url: &str) -> Result<String, FetchFailure> {
        let response = self
            .client
            .get(url)
            .header("Accept", "application/vnd.github+json")
            .send()
            .await
            .map_err(|e| FetchFailure::Transport {
                url: url.to_owned(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchFailure::Status {
                url: url.to_owned(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| FetchFailure::Transport {
            url: url.to_owned(),
            message: e.to_string(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct RemoteLoaderConfig {
    pub api_base: String,
    pub raw_base: String,
    pub fallback_branch: String,
    /// Raw file fetches in flight at once. Output order never depends on it.
    pub fetch_concurrency: usize,
}

impl Default for RemoteLoaderConfig {
    fn default() -> Self {
        Self {
            api_base: GITHUB_API_BASE.into(),
            raw_base: GITHUB_RAW_BASE.into(),
            fallback_branch: FALLBACK_BRANCH.into(),
            fetch_concurrency: 4,
        }
    }
}

#[derive(Deserialize)]
struct TreeResponse {
    #[serde(default)]
    tree: Vec<TreeEntry>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Deserialize)]
struct TreeEntry {
    path: String,
    #[serde(rename = "type")]
    kind: String,
}

pub struct RemoteLoader<F = HttpFetcher> {
    fetcher: F,
    config: RemoteLoaderConfig,
}

impl<F> std::fmt::Debug for RemoteLoader<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteLoader")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<F: RemoteFetch> RemoteLoader<F> {
    #[must_use]
    pub fn new(fetcher: F, mut config: RemoteLoaderConfig) -> Self {
        config.api_base = config.api_base.trim_end_matches('/').to_owned();
        config.raw_base = config.raw_base.trim_end_matches('/').to_owned();
        Self { fetcher, config }
    }

    /// Load every SKILL.md of the repository.
    ///
    /// When the branch listing is not found, the whole load is retried once on
    /// the fallback branch. Listing failures yield an empty result; individual
    /// file failures only drop that file.
    pub async fn load(&self, source: &RemoteSource) -> Vec<RawDocument> {
        let repo = format!("{}/{}", source.owner, source.repo);
        let branch = source.branch();
        match source.subpath() {
            Some(subpath) => tracing::info!(
                "loading skills from GitHub: {repo} (branch: {branch}, subpath: {subpath})"
            ),
            None => tracing::info!("loading skills from GitHub: {repo} (branch: {branch})"),
        }

        let documents = match self.load_branch(source, branch).await {
            Ok(docs) => docs,
            Err(e) if e.is_not_found() && branch != self.config.fallback_branch => {
                let fallback = self.config.fallback_branch.as_str();
                tracing::info!("branch '{branch}' not found, trying '{fallback}' for {repo}");
                match self.load_branch(source, fallback).await {
                    Ok(docs) => docs,
                    Err(e) => {
                        tracing::error!(
                            "failed to load skills from {repo} (tried '{branch}' and '{fallback}'): {e}"
                        );
                        Vec::new()
                    }
                }
            }
            Err(e) => {
                tracing::error!("failed to load skills from {repo}: {e}");
                Vec::new()
            }
        };

        tracing::info!(repo = %repo, count = documents.len(), "loaded remote skill documents");
        documents
    }

    async fn load_branch(
        &self,
        source: &RemoteSource,
        branch: &str,
    ) -> Result<Vec<RawDocument>, FetchFailure> {
        let paths = self.list_skill_paths(source, branch).await?;
        tracing::debug!(count = paths.len(), branch, "matched SKILL.md paths");

        let documents: Vec<RawDocument> = futures::stream::iter(paths)
            .map(|path| self.fetch_document(source, branch, path))
            .buffered(self.config.fetch_concurrency.max(1))
            .filter_map(std::future::ready)
            .collect()
            .await;
        Ok(documents)
    }

    async fn list_skill_paths(
        &self,
        source: &RemoteSource,
        branch: &str,
    ) -> Result<Vec<String>, FetchFailure> {
        let url = format!(
            "{}/repos/{}/{}/git/trees/{branch}?recursive=1",
            self.config.api_base, source.owner, source.repo
        );
        let body = self.fetcher.get(&url).await?;
        let tree: TreeResponse =
            serde_json::from_str(&body).map_err(|e| FetchFailure::Decode {
                url: url.clone(),
                message: e.to_string(),
            })?;

        if tree.truncated {
            tracing::warn!("tree listing for {url} was truncated, some skills may be missing");
        }

        Ok(filter_skill_paths(tree.tree, source.subpath()))
    }

    async fn fetch_document(
        &self,
        source: &RemoteSource,
        branch: &str,
        path: String,
    ) -> Option<RawDocument> {
        let raw_url = format!(
            "{}/{}/{}/{branch}/{path}",
            self.config.raw_base, source.owner, source.repo
        );
        match self.fetcher.get(&raw_url).await {
            Ok(content) => {
                tracing::debug!("fetched {path} from {}/{}", source.owner, source.repo);
                Some(RawDocument {
                    content,
                    origin: format!("{}/tree/{branch}/{path}", source.repo_url),
                })
            }
            Err(e) => {
                tracing::warn!("skipping {path}: {e}");
                None
            }
        }
    }
}

fn filter_skill_paths(entries: Vec<TreeEntry>, subpath: Option<&str>) -> Vec<String> {
    entries
        .into_iter()
        .filter(|e| e.kind == "blob" && is_skill_file(&e.path))
        .filter(|e| subpath.is_none_or(|prefix| e.path.starts_with(prefix)))
        .map(|e| e.path)
        .collect()
}

fn is_skill_file(path: &str) -> bool {
    path.rsplit('/').next() == Some(SKILL_FILE_NAME)
}

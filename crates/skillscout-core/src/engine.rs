use std::sync::{Arc, PoisonError, RwLock};
use std::time::Instant;

use skillscout_llm::EmbeddingProvider;
use skillscout_skills::github::{HttpFetcher, RemoteFetch};
use skillscout_skills::pipeline::RejectedDocument;
use skillscout_skills::{
    EmbeddingBasis, IndexError, RetrievalIndex, ScoredSkill, SkillIngestor, SourceSpec,
};
use tokio::sync::Mutex;

use crate::bootstrap::{configured_sources, create_ingestor};
use crate::config::Config;

/// Outcome of one ingest-and-build cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub skills: usize,
    pub rejected: Vec<RejectedDocument>,
}

/// Ingests skills from the configured sources and serves searches over the
/// current index.
///
/// Searches read an `Arc` snapshot of the index, so a concurrent
/// [`SkillEngine::reload`] never blocks or tears an in-flight query.
pub struct SkillEngine<P, F = HttpFetcher> {
    provider: P,
    ingestor: SkillIngestor<F>,
    sources: Vec<SourceSpec>,
    basis: EmbeddingBasis,
    index: RwLock<Arc<RetrievalIndex>>,
    reload_lock: Mutex<()>,
}

impl<P: EmbeddingProvider> SkillEngine<P> {
    /// Ingest every configured source and build the first index.
    ///
    /// # Errors
    ///
    /// Returns an error if any ingested skill cannot be embedded.
    pub async fn bootstrap(config: &Config, provider: P) -> Result<Self, IndexError> {
        let engine = Self::new(
            provider,
            create_ingestor(config),
            configured_sources(config),
            config.skills.embedding_basis,
        );
        engine.reload().await?;
        Ok(engine)
    }
}

impl<P: EmbeddingProvider, F: RemoteFetch> SkillEngine<P, F> {
    /// An engine with an empty index; call [`Self::reload`] to populate it.
    #[must_use]
    pub fn new(
        provider: P,
        ingestor: SkillIngestor<F>,
        sources: Vec<SourceSpec>,
        basis: EmbeddingBasis,
    ) -> Self {
        Self {
            provider,
            ingestor,
            sources,
            basis,
            index: RwLock::new(Arc::new(RetrievalIndex::empty())),
            reload_lock: Mutex::new(()),
        }
    }

    /// Re-ingest all sources, build a fresh index, and swap it in.
    ///
    /// On failure the previous index stays active.
    ///
    /// # Errors
    ///
    /// Returns an error if any ingested skill cannot be embedded.
    pub async fn reload(&self) -> Result<IngestSummary, IndexError> {
        let _guard = self.reload_lock.lock().await;
        let start = Instant::now();

        let report = self.ingestor.ingest(&self.sources).await;
        let index = RetrievalIndex::build(report.skills, &self.provider, self.basis).await?;

        let summary = IngestSummary {
            skills: index.len(),
            rejected: report.rejected,
        };
        *self.index.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(index);

        tracing::info!(
            skills = summary.skills,
            rejected = summary.rejected.len(),
            elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            "skill index ready"
        );
        Ok(summary)
    }

    /// Rank indexed skills against `query`.
    ///
    /// # Errors
    ///
    /// See [`RetrievalIndex::search`].
    pub async fn search(&self, query: &str, top_k: usize) -> Result<Vec<ScoredSkill>, IndexError> {
        let index = self.snapshot();
        index.search(&self.provider, query, top_k).await
    }

    /// The index currently being served.
    #[must_use]
    pub fn snapshot(&self) -> Arc<RetrievalIndex> {
        Arc::clone(&self.index.read().unwrap_or_else(PoisonError::into_inner))
    }

    #[must_use]
    pub fn sources(&self) -> &[SourceSpec] {
        &self.sources
    }
}

use crate::error::ParseFailure;
use crate::github::{HttpFetcher, RemoteFetch, RemoteLoader};
use crate::loader::{Skill, parse_skill};
use crate::local::load_local;
use crate::source::{RawDocument, SourceConfig, SourceSpec, resolve_sources};

/// A document that was fetched but did not parse into a skill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedDocument {
    pub origin: String,
    pub reason: ParseFailure,
}

#[derive(Debug, Default)]
pub struct IngestReport {
    /// Parsed skills, in source order then loader order.
    pub skills: Vec<Skill>,
    pub rejected: Vec<RejectedDocument>,
}

/// Runs every configured source through its loader and the SKILL.md parser.
#[derive(Debug)]
pub struct SkillIngestor<F = HttpFetcher> {
    remote: RemoteLoader<F>,
}

impl<F: RemoteFetch> SkillIngestor<F> {
    #[must_use]
    pub fn new(remote: RemoteLoader<F>) -> Self {
        Self { remote }
    }

    /// Load sources strictly in the given order and concatenate their skills.
    ///
    /// No deduplication happens: equal names from different sources are all kept.
    pub async fn ingest(&self, sources: &[SourceSpec]) -> IngestReport {
        let mut report = IngestReport::default();

        for source in sources {
            let documents = match source {
                SourceSpec::Remote(remote) => self.remote.load(remote).await,
                SourceSpec::Local(local) => load_local(local),
            };
            parse_into(documents, &mut report);
        }

        tracing::info!(
            skills = report.skills.len(),
            rejected = report.rejected.len(),
            "total skills loaded"
        );
        report
    }

    /// Validate raw config entries, then [`Self::ingest`] the valid ones.
    pub async fn ingest_configs(&self, configs: &[SourceConfig]) -> IngestReport {
        self.ingest(&resolve_sources(configs)).await
    }
}

fn parse_into(documents: Vec<RawDocument>, report: &mut IngestReport) {
    for doc in documents {
        match parse_skill(&doc.content, &doc.origin) {
            Ok(skill) => {
                tracing::debug!("loaded skill: {} from {}", skill.name(), skill.origin());
                report.skills.push(skill);
            }
            Err(reason) => {
                tracing::warn!("skipping skill from {}: {reason}", doc.origin);
                report.rejected.push(RejectedDocument {
                    origin: doc.origin,
                    reason,
                });
            }
        }
    }
}

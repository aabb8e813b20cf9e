//! SKILL.md parser, source loaders, ingestion pipeline, and retrieval index.

pub mod error;
pub mod github;
pub mod index;
pub mod loader;
pub mod local;
pub mod pipeline;
pub mod source;
pub mod watcher;

pub use error::{FetchFailure, IndexError, ParseFailure, SourceError};
pub use index::{EmbeddingBasis, RetrievalIndex, ScoredSkill};
pub use loader::{Skill, parse_skill};
pub use pipeline::{IngestReport, SkillIngestor};
pub use source::{RawDocument, SourceConfig, SourceSpec};

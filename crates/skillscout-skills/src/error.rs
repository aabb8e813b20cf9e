use skillscout_llm::LlmError;

/// Structural problems that make a document unusable as a skill.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseFailure {
    #[error("no frontmatter block")]
    NoFrontmatter,

    #[error("missing required field '{0}'")]
    MissingField(&'static str),
}

/// A single remote call that did not produce a usable body.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchFailure {
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("invalid response from {url}: {message}")]
    Decode { url: String, message: String },
}

impl FetchFailure {
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }
}

/// A source entry that cannot be turned into a [`crate::SourceSpec`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    #[error("unknown source type '{0}'")]
    UnknownType(String),

    #[error("{kind} source is missing required field '{field}'")]
    MissingField { kind: String, field: &'static str },

    #[error("invalid repository URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Failures that invalidate a whole index build or query.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("failed to embed skill '{name}': {source}")]
    Embedding { name: String, source: LlmError },

    #[error("failed to embed query: {0}")]
    QueryEmbedding(#[source] LlmError),

    #[error("embedding model returned an empty vector for '{0}'")]
    EmptyEmbedding(String),

    #[error("embedding dimension mismatch: index has {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("index was built with model '{indexed}' but queried with '{query}'")]
    ModelMismatch { indexed: String, query: String },

    #[error("top_k must be at least 1")]
    InvalidTopK,
}

//! Test-only mock embedding provider.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::LlmError;
use crate::provider::EmbeddingProvider;

/// Deterministic embeddings for tests.
///
/// With a vocabulary, component `i` of the vector is the number of times
/// `vocabulary[i]` occurs in the lowercased input, so texts sharing terms land
/// close together. Without one, every text maps to `embedding`.
#[derive(Debug, Clone)]
pub struct MockProvider {
    pub embedding: Vec<f32>,
    pub vocabulary: Vec<String>,
    pub fail_embed: bool,
    /// Fail only for inputs containing this substring.
    pub fail_on: Option<String>,
    pub model: String,
    calls: Arc<AtomicUsize>,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self {
            embedding: vec![1.0; 8],
            vocabulary: Vec::new(),
            fail_embed: false,
            fail_on: None,
            model: "mock-embed".into(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl MockProvider {
    #[must_use]
    pub fn with_vocabulary<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            vocabulary: terms.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_embedding(embedding: Vec<f32>) -> Self {
        Self {
            embedding,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail_embed: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn fail_on(mut self, needle: impl Into<String>) -> Self {
        self.fail_on = Some(needle.into());
        self
    }

    /// Number of `embed` calls made through this provider and its clones.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    #[allow(clippy::cast_precision_loss)]
    fn vectorize(&self, text: &str) -> Vec<f32> {
        if self.vocabulary.is_empty() {
            return self.embedding.clone();
        }
        let lower = text.to_lowercase();
        self.vocabulary
            .iter()
            .map(|term| lower.matches(term.to_lowercase().as_str()).count() as f32)
            .collect()
    }
}

impl EmbeddingProvider for MockProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        if self.fail_embed {
            return Err(LlmError::Other("mock embedding error".into()));
        }
        if let Some(needle) = &self.fail_on
            && text.contains(needle.as_str())
        {
            return Err(LlmError::Other(format!("mock embedding error for '{needle}'")));
        }
        Ok(self.vectorize(text))
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn vocabulary_counts_terms() {
        let provider = MockProvider::with_vocabulary(["gene", "plot"]);
        let v = provider.embed("Gene gene PLOT").await.unwrap();
        assert_eq!(v, vec![2.0, 1.0]);
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn constant_embedding_without_vocabulary() {
        let provider = MockProvider::with_embedding(vec![0.5, 0.5]);
        assert_eq!(provider.embed("anything").await.unwrap(), vec![0.5, 0.5]);
    }

    #[tokio::test]
    async fn fail_on_substring() {
        let provider = MockProvider::default().fail_on("bad");
        assert!(provider.embed("good text").await.is_ok());
        assert!(provider.embed("bad text").await.is_err());
    }

    #[tokio::test]
    async fn failing_always_errors() {
        assert!(MockProvider::failing().embed("x").await.is_err());
    }
}

use crate::error::LlmError;

pub trait EmbeddingProvider: Send + Sync {
    /// Embed `text` into a fixed-length vector.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable, rejects the request, or
    /// returns no vector.
    fn embed(&self, text: &str) -> impl Future<Output = Result<Vec<f32>, LlmError>> + Send;

    fn name(&self) -> &str;

    /// Identifier of the embedding model. Vectors from different models are not comparable.
    fn model(&self) -> &str;
}

impl<P: EmbeddingProvider> EmbeddingProvider for std::sync::Arc<P> {
    fn embed(&self, text: &str) -> impl Future<Output = Result<Vec<f32>, LlmError>> + Send {
        (**self).embed(text)
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn model(&self) -> &str {
        (**self).model()
    }
}

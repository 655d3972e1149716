//! Embedding infrastructure for memory retrieval.
//!
//! The EmbeddingService trait abstracts the provider so the memory context
//! builder never depends on a concrete backend. The provider name travels with
//! each call because every story picks its own.

pub mod cached;
pub mod hashing;
pub mod provider;

use async_trait::async_trait;

use crate::StoryError;

pub use cached::CachedEmbeddingService;
pub use hashing::HashingEmbeddingService;
pub use provider::{create_embedding_service, EmbeddingProviderConfig};

/// Service trait for generating text embeddings.
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    /// Embed `texts` with the named provider.
    ///
    /// Returns one vector per input text, in input order.
    async fn embed_texts(
        &self,
        provider: &str,
        texts: &[String],
    ) -> Result<Vec<Vec<f32>>, StoryError>;

    /// Check if the service can currently produce embeddings.
    fn is_available(&self) -> bool;

    /// Convenience wrapper for a single text.
    async fn embed_text(&self, provider: &str, text: &str) -> Result<Vec<f32>, StoryError> {
        self.embed_texts(provider, &[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoryError::Embedding("Provider returned no vectors".into()))
    }
}

/// No-op embedding service.
///
/// Always reports as unavailable and returns errors for embed operations.
/// Used where memory retrieval is switched off.
pub struct NoopEmbeddingService;

impl Default for NoopEmbeddingService {
    fn default() -> Self {
        Self::new()
    }
}

impl NoopEmbeddingService {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EmbeddingService for NoopEmbeddingService {
    async fn embed_texts(
        &self,
        _provider: &str,
        _texts: &[String],
    ) -> Result<Vec<Vec<f32>>, StoryError> {
        Err(StoryError::Embedding(
            "Embedding service is not available (noop)".to_string(),
        ))
    }

    fn is_available(&self) -> bool {
        false
    }
}

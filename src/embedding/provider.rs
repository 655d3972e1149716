//! Embedding provider configuration and factory.
//!
//! Backends are selected via a tagged enum. The remote providers a story
//! names (`openai`, ...) are served by whatever backend is configured here.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::embedding::hashing::DEFAULT_DIMENSIONS;
use crate::embedding::{
    CachedEmbeddingService, EmbeddingService, HashingEmbeddingService, NoopEmbeddingService,
};

/// Embedding provider configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "snake_case")]
pub enum EmbeddingProviderConfig {
    /// Local hashed n-gram vectors (default).
    Hashing {
        #[serde(default = "default_dimensions")]
        dimensions: usize,
    },
    /// No embeddings; memory context is always empty.
    Noop,
}

fn default_dimensions() -> usize {
    DEFAULT_DIMENSIONS
}

impl Default for EmbeddingProviderConfig {
    fn default() -> Self {
        Self::Hashing {
            dimensions: default_dimensions(),
        }
    }
}

/// Create an embedding service from provider configuration.
///
/// A non-zero `cache_capacity` wraps the backend in a [`CachedEmbeddingService`].
pub fn create_embedding_service(
    config: &EmbeddingProviderConfig,
    cache_capacity: u64,
) -> Arc<dyn EmbeddingService> {
    let backend: Arc<dyn EmbeddingService> = match config {
        EmbeddingProviderConfig::Hashing { dimensions } => {
            info!("Using hashing embeddings ({} dimensions)", dimensions);
            Arc::new(HashingEmbeddingService::new(*dimensions))
        }
        EmbeddingProviderConfig::Noop => {
            info!("Embeddings disabled; memory context will be empty");
            return Arc::new(NoopEmbeddingService::new());
        }
    };

    if cache_capacity == 0 {
        backend
    } else {
        Arc::new(CachedEmbeddingService::new(backend, cache_capacity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tagged_config() {
        let config: EmbeddingProviderConfig =
            toml::from_str("provider = \"hashing\"\ndimensions = 64").unwrap();
        assert_eq!(config, EmbeddingProviderConfig::Hashing { dimensions: 64 });

        let config: EmbeddingProviderConfig = toml::from_str("provider = \"noop\"").unwrap();
        assert_eq!(config, EmbeddingProviderConfig::Noop);
    }

    #[test]
    fn test_factory_availability() {
        assert!(create_embedding_service(&EmbeddingProviderConfig::default(), 10).is_available());
        assert!(!create_embedding_service(&EmbeddingProviderConfig::Noop, 10).is_available());
    }
}

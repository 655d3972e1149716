//! Query-embedding cache in front of any EmbeddingService.
//!
//! Live rooms repeat themselves: the same chat lines and gift messages come in
//! again and again, so vectors are cached per (provider, text).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;

use crate::embedding::EmbeddingService;
use crate::StoryError;

const DEFAULT_TTL_SECS: u64 = 3600;

pub struct CachedEmbeddingService {
    inner: Arc<dyn EmbeddingService>,
    cache: Cache<(String, String), Vec<f32>>,
}

impl CachedEmbeddingService {
    pub fn new(inner: Arc<dyn EmbeddingService>, capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(capacity)
            .time_to_live(Duration::from_secs(DEFAULT_TTL_SECS))
            .build();
        Self { inner, cache }
    }
}

#[async_trait]
impl EmbeddingService for CachedEmbeddingService {
    async fn embed_texts(
        &self,
        provider: &str,
        texts: &[String],
    ) -> Result<Vec<Vec<f32>>, StoryError> {
        let mut slots: Vec<Option<Vec<f32>>> = Vec::with_capacity(texts.len());
        let mut misses: Vec<String> = Vec::new();
        let mut miss_positions: Vec<usize> = Vec::new();

        for (idx, text) in texts.iter().enumerate() {
            let key = (provider.to_string(), text.clone());
            match self.cache.get(&key).await {
                Some(vector) => slots.push(Some(vector)),
                None => {
                    slots.push(None);
                    misses.push(text.clone());
                    miss_positions.push(idx);
                }
            }
        }

        if !misses.is_empty() {
            let fresh = self.inner.embed_texts(provider, &misses).await?;
            if fresh.len() != misses.len() {
                return Err(StoryError::Embedding(format!(
                    "Provider returned {} vectors for {} texts",
                    fresh.len(),
                    misses.len()
                )));
            }
            for ((position, text), vector) in miss_positions.into_iter().zip(misses).zip(fresh) {
                self.cache
                    .insert((provider.to_string(), text), vector.clone())
                    .await;
                slots[position] = Some(vector);
            }
        }

        Ok(slots.into_iter().flatten().collect())
    }

    fn is_available(&self) -> bool {
        self.inner.is_available()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingEmbedder {
        calls: AtomicUsize,
        texts_seen: AtomicUsize,
    }

    #[async_trait]
    impl EmbeddingService for CountingEmbedder {
        async fn embed_texts(
            &self,
            _provider: &str,
            texts: &[String],
        ) -> Result<Vec<Vec<f32>>, StoryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.texts_seen.fetch_add(texts.len(), Ordering::SeqCst);
            Ok(texts.iter().map(|t| vec![t.len() as f32]).collect())
        }

        fn is_available(&self) -> bool {
            true
        }
    }

    #[tokio::test]
    async fn test_second_lookup_hits_cache() {
        let inner = Arc::new(CountingEmbedder {
            calls: AtomicUsize::new(0),
            texts_seen: AtomicUsize::new(0),
        });
        let cached = CachedEmbeddingService::new(inner.clone(), 100);

        let first = cached
            .embed_texts("p", &["ab".to_string(), "abc".to_string()])
            .await
            .unwrap();
        let second = cached
            .embed_texts("p", &["abcd".to_string(), "ab".to_string()])
            .await
            .unwrap();

        assert_eq!(first, vec![vec![2.0], vec![3.0]]);
        assert_eq!(second, vec![vec![4.0], vec![2.0]]);
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
        assert_eq!(inner.texts_seen.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_provider_is_part_of_key() {
        let inner = Arc::new(CountingEmbedder {
            calls: AtomicUsize::new(0),
            texts_seen: AtomicUsize::new(0),
        });
        let cached = CachedEmbeddingService::new(inner.clone(), 100);

        cached.embed_text("a", "same").await.unwrap();
        cached.embed_text("b", "same").await.unwrap();
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }
}

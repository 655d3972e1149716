//! Deterministic local embeddings from hashed character n-grams.
//!
//! Not semantic in any deep sense, but texts that share words (or, for CJK,
//! character pairs) land close together. Good enough for offline use and tests.

use async_trait::async_trait;

use crate::embedding::EmbeddingService;
use crate::utils::math::vector_normalize;
use crate::StoryError;

pub const DEFAULT_DIMENSIONS: usize = 256;

pub struct HashingEmbeddingService {
    dimensions: usize,
}

impl Default for HashingEmbeddingService {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSIONS)
    }
}

impl HashingEmbeddingService {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Stored vectors must keep matching fresh queries across builds, so
    /// buckets come from a fixed hash function (first 8 bytes of BLAKE3,
    /// little-endian).
    fn bucket(&self, gram: &str) -> usize {
        let digest = blake3::hash(gram.as_bytes());
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&digest.as_bytes()[..8]);
        (u64::from_le_bytes(prefix) % self.dimensions as u64) as usize
    }

    /// Embed one text: unigrams and bigrams of the lower-cased, whitespace-free
    /// character sequence, hashed into buckets and L2-normalized.
    pub fn embed(&self, text: &str) -> Vec<f32> {
        let chars: Vec<char> = text
            .to_lowercase()
            .chars()
            .filter(|c| !c.is_whitespace() && !c.is_ascii_punctuation())
            .collect();

        let mut vector = vec![0.0f32; self.dimensions];
        for c in &chars {
            vector[self.bucket(&c.to_string())] += 1.0;
        }
        for pair in chars.windows(2) {
            let gram: String = pair.iter().collect();
            vector[self.bucket(&gram)] += 2.0;
        }
        vector_normalize(&vector)
    }
}

#[async_trait]
impl EmbeddingService for HashingEmbeddingService {
    async fn embed_texts(
        &self,
        _provider: &str,
        texts: &[String],
    ) -> Result<Vec<Vec<f32>>, StoryError> {
        Ok(texts.iter().map(|t| self.embed(t)).collect())
    }

    fn is_available(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::math::cosine_similarity;

    #[test]
    fn test_deterministic() {
        let svc = HashingEmbeddingService::default();
        assert_eq!(svc.embed("我喜欢猫"), svc.embed("我喜欢猫"));
        assert_eq!(svc.embed("hello").len(), DEFAULT_DIMENSIONS);
    }

    #[test]
    fn test_bucket_is_pinned_across_builds() {
        // BLAKE3("") = af1349b9f5f9a1a6...
        assert_eq!(HashingEmbeddingService::new(256).bucket(""), 0xaf);
        assert_eq!(HashingEmbeddingService::new(128).bucket(""), 47);
        assert_eq!(HashingEmbeddingService::new(1000).bucket(""), 863);
    }

    #[test]
    fn test_zero_dimensions_clamped() {
        let svc = HashingEmbeddingService::new(0);
        assert_eq!(svc.dimensions(), 1);
        assert_eq!(svc.embed("猫"), vec![1.0]);
    }

    #[test]
    fn test_shared_text_is_closer() {
        let svc = HashingEmbeddingService::new(512);
        let query = svc.embed("我喜欢猫");
        let related = svc.embed("用户喜欢猫咪");
        let unrelated = svc.embed("明天去北京出差");
        assert!(
            cosine_similarity(&query, &related) > cosine_similarity(&query, &unrelated),
            "overlapping text should score higher"
        );
    }

    #[test]
    fn test_empty_text_is_zero_vector() {
        let svc = HashingEmbeddingService::new(8);
        assert_eq!(svc.embed("   "), vec![0.0; 8]);
    }

    #[tokio::test]
    async fn test_order_preserved() {
        let svc = HashingEmbeddingService::default();
        let texts = vec!["a".to_string(), "b".to_string()];
        let vectors = svc.embed_texts("local", &texts).await.unwrap();
        assert_eq!(vectors[0], svc.embed("a"));
        assert_eq!(vectors[1], svc.embed("b"));
    }
}

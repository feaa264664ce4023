//! Mock embedding provider for tests and offline development.

use crate::embeddings::provider::EmbeddingProvider;
use hackrx_core::AppResult;

/// Deterministic, content-dependent embeddings with no network calls.
///
/// Each word is hashed into a handful of dimensions weighted by frequency,
/// then the vector is normalized. Not semantically meaningful, but stable
/// across calls, which is what tests need.
#[derive(Debug)]
pub struct MockEmbedder {
    dimensions: usize,
}

impl MockEmbedder {
    /// Create a new mock embedder with the given vector width.
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0; self.dimensions];

        let lower = text.to_lowercase();
        let mut word_freq = std::collections::HashMap::new();
        for word in lower.split_whitespace().filter(|w| w.len() > 2) {
            *word_freq.entry(word).or_insert(0u32) += 1;
        }

        for (word, freq) in word_freq {
            let hash = word
                .bytes()
                .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
            embedding[(hash as usize) % self.dimensions] += freq as f32;

            // A second dimension per word makes collisions less destructive
            let rehash = hash.wrapping_mul(37).wrapping_add(7);
            embedding[(rehash as usize) % self.dimensions] += (freq as f32).sqrt();
        }

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut embedding {
                *v /= norm;
            }
        }

        embedding
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for MockEmbedder {
    fn provider_name(&self) -> &str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "mock-hash-v1"
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed_one(text)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_embedder_deterministic() {
        let embedder = MockEmbedder::new(64);
        let first = embedder.embed("knee surgery waiting period").await.unwrap();
        let second = embedder.embed("knee surgery waiting period").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_mock_embedder_normalized() {
        let embedder = MockEmbedder::new(64);
        let embedding = embedder.embed("maternity coverage").await.unwrap();

        assert_eq!(embedding.len(), 64);
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 0.001);
    }

    #[tokio::test]
    async fn test_mock_embedder_distinguishes_texts() {
        let embedder = MockEmbedder::new(64);
        let first = embedder.embed("knee surgery").await.unwrap();
        let second = embedder.embed("dental exclusions").await.unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_mock_embedder_empty_text() {
        let embedder = MockEmbedder::new(64);
        let embedding = embedder.embed("").await.unwrap();
        assert!(embedding.iter().all(|&x| x == 0.0));
    }
}

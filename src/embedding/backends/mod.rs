//! Embedding backend implementations
//!
//! Local deterministic backends (token hashing, mock) plus a remote
//! OpenAI-compatible HTTP backend.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::embedding::{normalize_embedding, Embedder, Embedding, EmbeddingConfig};
use crate::error::{Error, Result};

pub mod remote;

pub use remote::HttpEmbedder;

/// Mock embedder for testing (generates random but deterministic embeddings).
pub struct MockEmbedder {
    config: EmbeddingConfig,
    dimension: usize,
}

impl MockEmbedder {
    /// Create a new mock embedder
    pub fn new(config: EmbeddingConfig, dimension: usize) -> Self {
        Self { config, dimension }
    }

    /// Generate a deterministic embedding based on text hash
    fn generate_embedding(&self, text: &str) -> Embedding {
        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        let seed = hasher.finish();

        // Simple LCG seeded by the text hash
        let mut embedding = Vec::with_capacity(self.dimension);
        let mut state = seed;

        for _ in 0..self.dimension {
            state = state.wrapping_mul(1103515245).wrapping_add(12345);
            let value = ((state / 65536) % 10000) as f32 / 10000.0 - 0.5;
            embedding.push(value);
        }

        if self.config.normalize {
            normalize_embedding(&mut embedding);
        }
        embedding
    }
}

impl Embedder for MockEmbedder {
    fn embed(&self, text: &str) -> Result<Embedding> {
        Ok(self.generate_embedding(text))
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>> {
        Ok(texts.iter().map(|&text| self.generate_embedding(text)).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.config.model_name
    }
}

/// Token-hashing embedder (bag of tokens with TF weighting).
///
/// Offline fallback that needs no model weights or network access. Texts
/// sharing vocabulary land near each other under cosine similarity, which is
/// enough for deterministic catalog retrieval and for tests.
pub struct TokenEmbedder {
    config: EmbeddingConfig,
    dimension: usize,
}

impl TokenEmbedder {
    /// Create a new token-based embedder
    pub fn new(config: EmbeddingConfig, dimension: usize) -> Self {
        Self { config, dimension }
    }

    /// Generate embeddings based on token hashing
    fn generate_embedding(&self, text: &str) -> Embedding {
        let mut embedding = vec![0.0; self.dimension];

        let tokens: Vec<&str> = text
            .split(|c: char| c.is_whitespace() || c.is_ascii_punctuation())
            .filter(|s| !s.is_empty())
            .collect();

        if tokens.is_empty() {
            return embedding;
        }

        // Hash each token to a position in the embedding
        for token in &tokens {
            let mut hasher = DefaultHasher::new();
            token.to_lowercase().hash(&mut hasher);
            let idx = (hasher.finish() as usize) % self.dimension;
            embedding[idx] += 1.0;
        }

        // Term-frequency normalization
        let total_tokens = tokens.len() as f32;
        for val in embedding.iter_mut() {
            *val /= total_tokens;
        }

        if self.config.normalize {
            normalize_embedding(&mut embedding);
        }

        embedding
    }
}

impl Embedder for TokenEmbedder {
    fn embed(&self, text: &str) -> Result<Embedding> {
        Ok(self.generate_embedding(text))
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>> {
        Ok(texts.iter().map(|&text| self.generate_embedding(text)).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.config.model_name
    }
}

/// Create an embedder based on backend name.
pub fn create_embedder(
    backend: &str,
    config: EmbeddingConfig,
    dimension: usize,
    api_key: Option<&str>,
    base_url: Option<&str>,
) -> Result<Arc<dyn Embedder>> {
    match backend {
        "mock" => Ok(Arc::new(MockEmbedder::new(config, dimension))),
        "token" => Ok(Arc::new(TokenEmbedder::new(config, dimension))),
        "openai" => {
            let api_key = api_key.ok_or_else(|| {
                Error::Config("openai embedding backend requires an API key".to_string())
            })?;
            let base_url = base_url.unwrap_or("https://api.openai.com/v1");
            let embedder = HttpEmbedder::new(api_key, base_url, config, dimension)?;
            Ok(Arc::new(embedder))
        }
        other => {
            tracing::warn!("Unknown embedding backend '{}', using token embedder", other);
            Ok(Arc::new(TokenEmbedder::new(config, dimension)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_embedder_deterministic() {
        let embedder = MockEmbedder::new(EmbeddingConfig::default(), 384);

        let a = embedder.embed("some text").unwrap();
        let b = embedder.embed("some text").unwrap();
        let c = embedder.embed("other text").unwrap();

        assert_eq!(a.len(), 384);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_token_embedder_shared_vocabulary_is_closer() {
        use crate::embedding::cosine_similarity;

        let embedder = TokenEmbedder::new(EmbeddingConfig::default(), 256);

        let query = embedder.embed("school comedy anime").unwrap();
        let near = embedder.embed("a school comedy about club life").unwrap();
        let far = embedder.embed("giant robots fight in space").unwrap();

        assert!(cosine_similarity(&query, &near) > cosine_similarity(&query, &far));
    }

    #[test]
    fn test_token_embedder_empty_text() {
        let embedder = TokenEmbedder::new(EmbeddingConfig::default(), 64);
        let emb = embedder.embed("   ").unwrap();
        assert!(emb.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_factory_requires_key_for_openai() {
        let err = create_embedder("openai", EmbeddingConfig::default(), 384, None, None)
            .err()
            .unwrap();
        assert!(matches!(err, Error::Config(_)));
    }
}

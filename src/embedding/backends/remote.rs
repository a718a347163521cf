//! Remote embedding backend
//!
//! Blocking client for OpenAI-compatible `/embeddings` endpoints.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use crate::embedding::{normalize_embedding, Embedder, Embedding, EmbeddingConfig};
use crate::error::{Error, Result};

/// Embedder that calls an OpenAI-compatible embeddings endpoint.
pub struct HttpEmbedder {
    client: Client,
    endpoint: String,
    config: EmbeddingConfig,
    dimension: usize,
}

impl HttpEmbedder {
    /// Build a new client for the given endpoint and credential.
    pub fn new(
        api_key: &str,
        base_url: &str,
        config: EmbeddingConfig,
        dimension: usize,
    ) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(Error::Config("embedding API key is empty".to_string()));
        }

        let mut headers = HeaderMap::new();
        let auth = format!("Bearer {}", api_key.trim());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth)
                .map_err(|_| Error::Config("embedding API key is not a valid header".to_string()))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .default_headers(headers)
            .build()
            .map_err(Error::embedding)?;

        Ok(Self {
            client,
            endpoint: format!("{}/embeddings", base_url.trim_end_matches('/')),
            config,
            dimension,
        })
    }

    fn request(&self, inputs: &[&str]) -> Result<Vec<Embedding>> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let body = EmbeddingRequest {
            model: &self.config.model_name,
            input: inputs,
        };
        let resp = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .map_err(Error::embedding)?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp
                .text()
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(Error::Embedding(
                format!("embeddings endpoint returned {status}: {text}").into(),
            ));
        }

        let mut parsed: EmbeddingResponse = resp.json().map_err(Error::embedding)?;
        parsed.data.sort_by_key(|entry| entry.index);
        if parsed.data.len() != inputs.len() {
            return Err(Error::Embedding(
                format!(
                    "endpoint returned {} embeddings for {} inputs",
                    parsed.data.len(),
                    inputs.len()
                )
                .into(),
            ));
        }

        let mut embeddings = Vec::with_capacity(parsed.data.len());
        for entry in parsed.data {
            if entry.embedding.len() != self.dimension {
                return Err(Error::Embedding(
                    format!(
                        "endpoint returned dimension {} but {} was configured",
                        entry.embedding.len(),
                        self.dimension
                    )
                    .into(),
                ));
            }
            let mut embedding = entry.embedding;
            if self.config.normalize {
                normalize_embedding(&mut embedding);
            }
            embeddings.push(embedding);
        }
        Ok(embeddings)
    }
}

impl Embedder for HttpEmbedder {
    fn embed(&self, text: &str) -> Result<Embedding> {
        let mut embeddings = self.request(&[text])?;
        embeddings
            .pop()
            .ok_or_else(|| Error::Embedding("endpoint returned no embedding".into()))
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.config.batch_size.max(1)) {
            embeddings.extend(self.request(batch)?);
        }
        Ok(embeddings)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.config.model_name
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_api_key_rejected() {
        let err = HttpEmbedder::new("  ", "https://api.openai.com/v1", EmbeddingConfig::default(), 384)
            .err()
            .unwrap();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_endpoint_normalization() {
        let embedder = HttpEmbedder::new(
            "key",
            "https://api.openai.com/v1/",
            EmbeddingConfig::default(),
            384,
        )
        .unwrap();
        assert_eq!(embedder.endpoint, "https://api.openai.com/v1/embeddings");
    }
}

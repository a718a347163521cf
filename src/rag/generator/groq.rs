//! Groq chat-completions client
//!
//! Blocking client for the OpenAI-compatible chat API served by Groq.
//! Failures are never retried here; retry policy belongs to the caller.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::LanguageModel;

/// Default OpenAI-compatible base URL for Groq.
pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Configuration for the Groq client.
#[derive(Debug, Clone)]
pub struct GroqConfig {
    /// Model identifier, e.g. "llama-3.3-70b-versatile"
    pub model: String,
    /// OpenAI-compatible base URL
    pub base_url: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Completion token budget
    pub max_tokens: usize,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for GroqConfig {
    fn default() -> Self {
        Self {
            model: "llama-3.3-70b-versatile".to_string(),
            base_url: GROQ_BASE_URL.to_string(),
            temperature: 0.0,
            max_tokens: 1024,
            timeout: Duration::from_secs(60),
        }
    }
}

/// Chat-completions client for Groq (or any OpenAI-compatible endpoint).
pub struct GroqGenerator {
    client: Client,
    endpoint: String,
    config: GroqConfig,
}

impl GroqGenerator {
    /// Build a new client with the given credential.
    pub fn new(api_key: &str, config: GroqConfig) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(Error::Config("language-model API key is empty".to_string()));
        }

        let mut headers = HeaderMap::new();
        let auth = format!("Bearer {}", api_key.trim());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth)
                .map_err(|_| Error::Config("API key is not a valid header value".to_string()))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(Error::generation)?;

        let endpoint = format!(
            "{}/chat/completions",
            config.base_url.trim_end_matches('/')
        );

        Ok(Self {
            client,
            endpoint,
            config,
        })
    }
}

impl LanguageModel for GroqGenerator {
    fn complete(&self, prompt: &str) -> Result<String> {
        let body = ChatRequest {
            model: &self.config.model,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let resp = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .map_err(Error::generation)?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp
                .text()
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(Error::Generation(
                format!("chat completions returned {status}: {text}").into(),
            ));
        }

        let parsed: ChatResponse = resp.json().map_err(Error::generation)?;
        let answer = parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| Error::Generation("model returned no choices".into()))?;

        Ok(answer)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    max_tokens: usize,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_api_key_rejected() {
        let err = GroqGenerator::new("   ", GroqConfig::default()).err().unwrap();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_endpoint_from_base_url() {
        let generator = GroqGenerator::new("key", GroqConfig::default()).unwrap();
        assert_eq!(
            generator.endpoint,
            "https://api.groq.com/openai/v1/chat/completions"
        );
        assert_eq!(generator.model_name(), "llama-3.3-70b-versatile");
    }
}

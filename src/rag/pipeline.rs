//! Recommendation engine
//!
//! Orchestrates the per-request flow: validate query, retrieve context,
//! assemble the prompt, call the language model, return the answer.
//! All shared state is read-only after construction, so one engine instance
//! serves concurrent callers.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::embedding::Embedder;
use crate::error::{Error, Result};
use crate::index::VectorIndex;
use crate::retrieval::{IndexRetriever, Retriever, DEFAULT_TOP_K};

use super::context::{ContextBuilder, RECOMMENDER_TEMPLATE};
use super::generator::LanguageModel;

/// Configuration for the recommendation engine.
#[derive(Debug, Clone)]
pub struct RecommenderConfig {
    /// Number of chunks to retrieve per query
    pub top_k: usize,
    /// Maximum characters of retrieved context in the prompt
    pub max_context_chars: usize,
    /// Prompt template name
    pub template_name: String,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            max_context_chars: 4000,
            template_name: RECOMMENDER_TEMPLATE.to_string(),
        }
    }
}

impl RecommenderConfig {
    /// Set the retrieval depth.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Set the context character budget.
    pub fn with_max_context_chars(mut self, chars: usize) -> Self {
        self.max_context_chars = chars;
        self
    }
}

/// Source chunk reference included in a detailed recommendation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Source {
    /// Chunk identifier
    pub chunk_id: String,
    /// Parent document identifier
    pub document_id: String,
    /// Relevance score from retrieval
    pub score: f32,
    /// Text snippet from the source
    pub snippet: String,
}

/// A recommendation with its provenance and timings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    /// The model's answer text, returned unmodified
    pub answer: String,
    /// Retrieved chunks the answer was grounded in
    pub sources: Vec<Source>,
    /// Retrieval time in milliseconds
    pub retrieval_time_ms: u64,
    /// Generation time in milliseconds
    pub generation_time_ms: u64,
}

/// The recommendation engine.
///
/// Construct once per process (the index loads at construction, never per
/// request) and share across callers.
pub struct Recommender {
    retriever: Arc<dyn Retriever>,
    model: Arc<dyn LanguageModel>,
    context_builder: ContextBuilder,
    config: RecommenderConfig,
}

impl Recommender {
    /// Load the index at `index_dir` and build an engine over it.
    ///
    /// Any failure (missing/corrupt index, malformed template) is wrapped in
    /// [`Error::Initialization`] with the cause preserved.
    pub fn open(
        index_dir: &std::path::Path,
        embedder: Arc<dyn Embedder>,
        model: Arc<dyn LanguageModel>,
        config: RecommenderConfig,
    ) -> Result<Self> {
        tracing::info!("Initializing recommender over index at {:?}", index_dir);

        let index = VectorIndex::load(index_dir, &embedder).map_err(Error::initialization)?;
        let retriever = Arc::new(IndexRetriever::new(Arc::new(index), embedder));

        Self::new(retriever, model, config).map_err(|err| match err {
            wrapped @ Error::Initialization(_) => wrapped,
            other => Error::initialization(other),
        })
    }

    /// Build an engine over an already-constructed retriever.
    pub fn new(
        retriever: Arc<dyn Retriever>,
        model: Arc<dyn LanguageModel>,
        config: RecommenderConfig,
    ) -> Result<Self> {
        let context_builder = ContextBuilder::new();
        context_builder
            .templates()
            .validate(&config.template_name)
            .map_err(Error::initialization)?;

        tracing::info!(
            "Recommender ready (retriever={}, model={}, top_k={})",
            retriever.name(),
            model.model_name(),
            config.top_k
        );

        Ok(Self {
            retriever,
            model,
            context_builder,
            config,
        })
    }

    /// Produce a recommendation for the query, returning the raw answer text.
    pub fn recommend(&self, query: &str) -> Result<String> {
        self.recommend_detailed(query).map(|r| r.answer)
    }

    /// Produce a recommendation with sources and timings.
    pub fn recommend_detailed(&self, query: &str) -> Result<Recommendation> {
        // Validation: the only input-shape check the engine performs.
        if query.trim().is_empty() {
            tracing::warn!("Rejected blank recommendation query");
            return Err(Error::InvalidQuery);
        }

        tracing::info!("Recommendation query: '{}'", query);

        let retrieval_start = Instant::now();
        let results = self.retriever.retrieve(query, self.config.top_k)?;
        let retrieval_time_ms = retrieval_start.elapsed().as_millis() as u64;
        tracing::debug!(
            "Retrieved {} chunks in {}ms",
            results.len(),
            retrieval_time_ms
        );

        let context = self
            .context_builder
            .build(&results, self.config.max_context_chars);
        let prompt =
            self.context_builder
                .format_prompt(query, &context, &self.config.template_name);

        let generation_start = Instant::now();
        let answer = self.model.complete(&prompt)?;
        let generation_time_ms = generation_start.elapsed().as_millis() as u64;
        tracing::debug!("Generated answer in {}ms", generation_time_ms);

        // Advisory only: the answer is returned unmodified either way.
        if !looks_like_three_recommendations(&answer) {
            tracing::warn!("Model reply does not contain three numbered recommendations");
        }

        let sources = results
            .iter()
            .map(|result| Source {
                chunk_id: result.chunk_id.clone(),
                document_id: result.chunk.source_id.clone(),
                score: result.score,
                snippet: truncate_snippet(&result.chunk.text, 200),
            })
            .collect();

        Ok(Recommendation {
            answer,
            sources,
            retrieval_time_ms,
            generation_time_ms,
        })
    }

    /// The engine configuration.
    pub fn config(&self) -> &RecommenderConfig {
        &self.config
    }
}

/// Check whether the reply contains the markers "1.", "2.", "3." at line
/// starts, the shape the prompt asks for.
fn looks_like_three_recommendations(answer: &str) -> bool {
    let mut seen = [false; 3];
    for line in answer.lines() {
        let line = line.trim_start();
        for (i, marker) in ["1.", "2.", "3."].iter().enumerate() {
            if line.starts_with(marker) {
                seen[i] = true;
            }
        }
    }
    seen.iter().all(|&s| s)
}

/// Truncate a text snippet to max length, preserving word boundaries.
fn truncate_snippet(text: &str, max_len: usize) -> String {
    if text.len() <= max_len {
        return text.to_string();
    }

    let mut cut = max_len;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    let truncated = &text[..cut];
    if let Some(last_space) = truncated.rfind(' ') {
        format!("{}...", &truncated[..last_space])
    } else {
        format!("{truncated}...")
    }
}

//! Command-line interface
//!
//! Implements the `build` (offline indexing) and `recommend` (online query)
//! commands.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::data::{CatalogNormalizer, ChunkConfig, OverlappingChunker};
use crate::embedding::{create_embedder, Embedder, EmbeddingConfig};
use crate::index::VectorIndex;
use crate::rag::generator::groq::{GroqConfig, GroqGenerator};
use crate::rag::{Recommender, RecommenderConfig};

/// Embedder-related CLI options shared by both commands.
pub struct EmbedderOptions {
    /// Backend name: token, mock, or openai
    pub backend: String,
    /// Embedding model name
    pub model: String,
    /// Embedding dimensionality
    pub dimension: usize,
    /// API key for the openai backend
    pub api_key: Option<String>,
    /// Base URL override for the openai backend
    pub base_url: Option<String>,
}

impl EmbedderOptions {
    fn build(&self) -> Result<Arc<dyn Embedder>> {
        let config = EmbeddingConfig {
            model_name: self.model.clone(),
            ..EmbeddingConfig::default()
        };
        let embedder = create_embedder(
            &self.backend,
            config,
            self.dimension,
            self.api_key.as_deref(),
            self.base_url.as_deref(),
        )
        .context("failed to construct embedder")?;
        Ok(embedder)
    }
}

/// Execute the build command: normalize → chunk → embed → persist.
pub fn build(
    input: &Path,
    corpus: &Path,
    index_dir: &Path,
    chunk_size: usize,
    chunk_overlap: usize,
    embedder_opts: &EmbedderOptions,
) -> Result<()> {
    tracing::info!("Starting index build");
    tracing::info!("  Catalog: {:?}", input);
    tracing::info!("  Corpus: {:?}", corpus);
    tracing::info!("  Index: {:?}", index_dir);

    let normalizer = CatalogNormalizer::new(input, corpus);
    let documents = normalizer
        .normalize()
        .context("catalog normalization failed")?;
    anyhow::ensure!(
        !documents.is_empty(),
        "catalog produced zero valid documents"
    );

    let chunker = OverlappingChunker::new(ChunkConfig {
        window: chunk_size,
        overlap: chunk_overlap,
    })
    .context("invalid chunking parameters")?;
    let chunks = chunker
        .chunk_all(&documents)
        .context("chunking failed")?;

    let embedder = embedder_opts.build()?;
    let index = VectorIndex::build(chunks, &embedder, index_dir)
        .context("index build failed")?;

    println!("\nBuild Summary:");
    println!("  Documents: {}", documents.len());
    println!("  Chunks indexed: {}", index.len());
    println!("  Embedding model: {}", index.metadata().model_name);
    println!("  Index directory: {}", index_dir.display());

    Ok(())
}

/// Execute the recommend command against a previously built index.
#[allow(clippy::too_many_arguments)]
pub fn recommend(
    index_dir: &Path,
    query: &str,
    top_k: usize,
    embedder_opts: &EmbedderOptions,
    llm_api_key: Option<&str>,
    llm_model: &str,
    llm_base_url: &str,
    dry_run: bool,
) -> Result<()> {
    let embedder = embedder_opts.build()?;

    if dry_run {
        // Retrieval only: print the chunks that would ground the prompt.
        use crate::retrieval::{IndexRetriever, Retriever};

        let index = VectorIndex::load(index_dir, &embedder)
            .context("failed to load index")?;
        let retriever = IndexRetriever::new(Arc::new(index), embedder);
        let results = retriever.retrieve(query, top_k)?;

        println!("--- Retrieved Context ---");
        for result in &results {
            println!("[{}] (score {:.4}) {}", result.rank, result.score, result.chunk.text);
        }
        println!("\ndry-run enabled; skipping language-model call.");
        return Ok(());
    }

    let api_key = llm_api_key
        .filter(|key| !key.trim().is_empty())
        .context("GROQ_API_KEY must be set (or pass --api-key)")?;

    let groq_config = GroqConfig {
        model: llm_model.to_string(),
        base_url: llm_base_url.to_string(),
        ..GroqConfig::default()
    };
    let model = Arc::new(GroqGenerator::new(api_key, groq_config)?);

    let config = RecommenderConfig::default().with_top_k(top_k);
    let recommender = Recommender::open(index_dir, embedder, model, config)
        .context("failed to initialize recommendation engine")?;

    let response = recommender.recommend_detailed(query)?;

    println!("{}", response.answer);
    println!("\nSources:");
    for source in &response.sources {
        println!(
            "  {} (score {:.4}): {}",
            source.document_id, source.score, source.snippet
        );
    }
    tracing::info!(
        "Timing: retrieval={}ms, generation={}ms",
        response.retrieval_time_ms,
        response.generation_time_ms
    );

    Ok(())
}

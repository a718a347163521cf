//! Query-time retrieval
//!
//! Thin composition over the embedder and the persisted index: validate the
//! query, embed it, and delegate to similarity search.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::data::Chunk;
use crate::embedding::Embedder;
use crate::error::{Error, Result};
use crate::index::VectorIndex;

/// Default number of chunks returned when the caller does not override it.
pub const DEFAULT_TOP_K: usize = 4;

/// Search result with chunk and relevance score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// Chunk ID
    pub chunk_id: String,
    /// The actual chunk content and metadata
    pub chunk: Chunk,
    /// Cosine similarity score (higher is better)
    pub score: f32,
    /// Rank in the result list (1-indexed)
    pub rank: usize,
}

/// Trait for retrieval engines.
pub trait Retriever: Send + Sync {
    /// Retrieve the top-k most relevant chunks for a query.
    fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<SearchResult>>;

    /// Get the name of this retriever.
    fn name(&self) -> &str;
}

/// Retriever over a loaded [`VectorIndex`].
///
/// Holds only shared read-only state, so one instance can serve concurrent
/// callers.
pub struct IndexRetriever {
    index: Arc<VectorIndex>,
    embedder: Arc<dyn Embedder>,
}

impl IndexRetriever {
    /// Create a retriever over an already-loaded index.
    pub fn new(index: Arc<VectorIndex>, embedder: Arc<dyn Embedder>) -> Self {
        Self { index, embedder }
    }

    /// The underlying index.
    pub fn index(&self) -> &VectorIndex {
        &self.index
    }
}

impl Retriever for IndexRetriever {
    fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<SearchResult>> {
        // Fail fast before any embedding work.
        if query.trim().is_empty() {
            return Err(Error::InvalidQuery);
        }

        let query_embedding = self.embedder.embed(query)?;
        let hits = self.index.search(&query_embedding, top_k);

        Ok(hits
            .into_iter()
            .enumerate()
            .map(|(rank, hit)| SearchResult {
                chunk_id: hit.chunk.id.clone(),
                chunk: hit.chunk,
                score: hit.score,
                rank: rank + 1,
            })
            .collect())
    }

    fn name(&self) -> &str {
        "vector-index"
    }
}

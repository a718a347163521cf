//! Persistent embedding index
//!
//! Stores embedded chunks on disk and serves exact cosine-similarity search
//! over them. Build is a one-shot batch operation that fully replaces the
//! persisted location; search is read-only and safe for concurrent callers.
//!
//! Directory layout: `chunks.json`, `vectors.json`, `metadata.json`.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::data::Chunk;
use crate::embedding::{cosine_similarity, Embedder, Embedding};
use crate::error::{Error, Result};

const CHUNKS_FILE: &str = "chunks.json";
const VECTORS_FILE: &str = "vectors.json";
const METADATA_FILE: &str = "metadata.json";

/// Index metadata, persisted alongside the vectors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexMetadata {
    /// Model name used for embeddings
    pub model_name: String,
    /// Embedding dimension
    pub dimension: usize,
    /// Number of chunks indexed
    pub num_chunks: usize,
    /// Index creation timestamp
    pub created_at: String,
}

/// A chunk returned by similarity search, with its cosine score.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}

/// In-memory handle over a persisted embedding index.
///
/// Vectors are stored in insertion order; search uses an exact cosine scan
/// with a stable sort, so equal scores keep insertion order and results are
/// fully deterministic for a fixed corpus and query vector.
#[derive(Debug)]
pub struct VectorIndex {
    chunks: Vec<Chunk>,
    vectors: Vec<Embedding>,
    metadata: IndexMetadata,
}

impl VectorIndex {
    /// Embed the given chunks and persist a fresh index at `index_dir`.
    ///
    /// The persisted location is fully replaced (write to a scratch directory,
    /// then atomic rename), so rebuilding with the same chunk sequence is
    /// idempotent and never accumulates duplicates.
    pub fn build(
        chunks: Vec<Chunk>,
        embedder: &Arc<dyn Embedder>,
        index_dir: &Path,
    ) -> Result<Self> {
        if chunks.is_empty() {
            return Err(Error::Config(
                "cannot build an index from zero chunks".to_string(),
            ));
        }

        tracing::info!("Embedding {} chunks for index build", chunks.len());
        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let vectors = embedder.embed_batch(&texts)?;

        let dimension = embedder.dimension();
        for vector in &vectors {
            if vector.len() != dimension {
                return Err(Error::Embedding(
                    format!(
                        "embedder produced dimension {} but reports {}",
                        vector.len(),
                        dimension
                    )
                    .into(),
                ));
            }
        }

        let metadata = IndexMetadata {
            model_name: embedder.model_name().to_string(),
            dimension,
            num_chunks: chunks.len(),
            created_at: chrono::Utc::now().to_rfc3339(),
        };

        let index = Self {
            chunks,
            vectors,
            metadata,
        };
        index.persist(index_dir)?;
        Ok(index)
    }

    /// Write all artifacts to a scratch directory, then swap it into place.
    fn persist(&self, index_dir: &Path) -> Result<()> {
        let scratch = scratch_dir(index_dir);
        if scratch.exists() {
            fs::remove_dir_all(&scratch)?;
        }
        fs::create_dir_all(&scratch)?;

        fs::write(
            scratch.join(CHUNKS_FILE),
            serde_json::to_string_pretty(&self.chunks)?,
        )?;
        fs::write(
            scratch.join(VECTORS_FILE),
            serde_json::to_string(&self.vectors)?,
        )?;
        fs::write(
            scratch.join(METADATA_FILE),
            serde_json::to_string_pretty(&self.metadata)?,
        )?;

        if index_dir.exists() {
            fs::remove_dir_all(index_dir)?;
        }
        fs::rename(&scratch, index_dir)?;

        tracing::info!(
            "Index persisted to {:?} ({} chunks, dim {})",
            index_dir,
            self.metadata.num_chunks,
            self.metadata.dimension
        );
        Ok(())
    }

    /// Open a previously persisted index for querying.
    ///
    /// Fails with [`Error::IndexNotFound`] when no index exists at the
    /// location, or [`Error::IndexCorrupt`] when the persisted artifacts fail
    /// integrity checks (undecodable files, count mismatch, or a dimension
    /// that does not match the configured embedder).
    pub fn load(index_dir: &Path, embedder: &Arc<dyn Embedder>) -> Result<Self> {
        tracing::info!("Loading index from {:?}", index_dir);

        let metadata_path = index_dir.join(METADATA_FILE);
        if !metadata_path.is_file() {
            return Err(Error::IndexNotFound(index_dir.to_path_buf()));
        }

        let metadata: IndexMetadata = read_artifact(index_dir, METADATA_FILE)?;
        let chunks: Vec<Chunk> = read_artifact(index_dir, CHUNKS_FILE)?;
        let vectors: Vec<Embedding> = read_artifact(index_dir, VECTORS_FILE)?;

        if chunks.len() != vectors.len() || chunks.len() != metadata.num_chunks {
            return Err(corrupt(
                index_dir,
                format!(
                    "artifact counts disagree: {} chunks, {} vectors, metadata says {}",
                    chunks.len(),
                    vectors.len(),
                    metadata.num_chunks
                ),
            ));
        }

        if metadata.dimension != embedder.dimension() {
            return Err(corrupt(
                index_dir,
                format!(
                    "stored dimension {} does not match embedder dimension {}",
                    metadata.dimension,
                    embedder.dimension()
                ),
            ));
        }

        if let Some(bad) = vectors.iter().find(|v| v.len() != metadata.dimension) {
            return Err(corrupt(
                index_dir,
                format!(
                    "stored vector has dimension {} but metadata says {}",
                    bad.len(),
                    metadata.dimension
                ),
            ));
        }

        if embedder.model_name() != metadata.model_name {
            tracing::warn!(
                "Embedder model mismatch: index={}, embedder={}",
                metadata.model_name,
                embedder.model_name()
            );
        }

        Ok(Self {
            chunks,
            vectors,
            metadata,
        })
    }

    /// Return the `k` nearest stored chunks to `query` by cosine similarity,
    /// in descending score order; ties keep insertion order.
    pub fn search(&self, query: &Embedding, k: usize) -> Vec<ScoredChunk> {
        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(i, v)| (i, cosine_similarity(query, v)))
            .collect();

        // Stable sort keeps insertion order for equal scores.
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);

        scored
            .into_iter()
            .map(|(i, score)| ScoredChunk {
                chunk: self.chunks[i].clone(),
                score,
            })
            .collect()
    }

    /// Index metadata.
    pub fn metadata(&self) -> &IndexMetadata {
        &self.metadata
    }

    /// Number of indexed chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// True when the index holds no chunks.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

fn scratch_dir(index_dir: &Path) -> PathBuf {
    let mut name = index_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "index".to_string());
    name.push_str(".building");
    index_dir.with_file_name(name)
}

fn read_artifact<T: serde::de::DeserializeOwned>(index_dir: &Path, file: &str) -> Result<T> {
    let raw = fs::read_to_string(index_dir.join(file))
        .map_err(|err| corrupt(index_dir, format!("cannot read {file}: {err}")))?;
    serde_json::from_str(&raw)
        .map_err(|err| corrupt(index_dir, format!("cannot decode {file}: {err}")))
}

fn corrupt(index_dir: &Path, reason: String) -> Error {
    Error::IndexCorrupt {
        path: index_dir.to_path_buf(),
        reason,
    }
}

//! Catalog ingestion and chunking
//!
//! This module provides functionality for loading anime catalog records from
//! CSV, fusing them into single-text documents, and splitting those documents
//! into bounded-length chunks for embedding and retrieval.

use serde::{Deserialize, Serialize};

pub mod chunkers;
pub mod loaders;

// Re-exports for convenience
pub use chunkers::*;
pub use loaders::*;

/// One raw catalog row after field extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimeRecord {
    /// Anime title
    pub name: String,
    /// Comma-separated genre list
    pub genres: String,
    /// Plot synopsis
    pub synopsis: String,
}

impl AnimeRecord {
    /// True when all three fields carry non-whitespace content.
    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty()
            && !self.genres.trim().is_empty()
            && !self.synopsis.trim().is_empty()
    }

    /// Fuse the record into the single text field used for embedding.
    pub fn fused_text(&self) -> String {
        format!(
            "Title: {} .. Overview: {} Genres: {}",
            self.name, self.synopsis, self.genres
        )
    }
}

/// A fused catalog entry: one searchable document per valid record.
///
/// Created once at index-build time and immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusedDocument {
    /// Opaque identifier, stable across rebuilds of the same corpus
    pub id: String,
    /// Fused text: "Title: .. Overview: .. Genres: .."
    pub text: String,
}

impl FusedDocument {
    /// Build a document from a record and its input row position.
    pub fn from_record(row_index: usize, record: &AnimeRecord) -> Self {
        Self {
            id: format!("anime_{row_index}"),
            text: record.fused_text(),
        }
    }
}

/// A bounded-length text fragment derived from one [`FusedDocument`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Unique identifier: "{source_id}_{sequence_index}"
    pub id: String,
    /// Parent document's id
    pub source_id: String,
    /// Chunk text, at most `window` characters
    pub text: String,
    /// Position of this chunk within its document
    pub sequence_index: usize,
}

impl Chunk {
    /// Create a new chunk for the given document slice.
    pub fn new(source_id: &str, text: String, sequence_index: usize) -> Self {
        Self {
            id: format!("{source_id}_{sequence_index}"),
            source_id: source_id.to_string(),
            text,
            sequence_index,
        }
    }
}

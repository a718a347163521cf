//! Text chunking
//!
//! Splits fused documents into bounded-length overlapping character windows.
//! Boundaries are character-based, not semantic.

use crate::data::{Chunk, FusedDocument};
use crate::error::{Error, Result};

/// Configuration for chunking.
#[derive(Debug, Clone, Copy)]
pub struct ChunkConfig {
    /// Window length in characters
    pub window: usize,
    /// Overlap between consecutive windows, in characters
    pub overlap: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            window: 1000,
            overlap: 40,
        }
    }
}

impl ChunkConfig {
    /// Validate the chunking parameters.
    ///
    /// Fails with [`Error::Config`] unless `overlap < window`.
    pub fn validate(&self) -> Result<()> {
        if self.window == 0 {
            return Err(Error::Config("chunk window must be non-zero".to_string()));
        }
        if self.overlap >= self.window {
            return Err(Error::Config(format!(
                "chunk overlap ({}) must be smaller than window ({})",
                self.overlap, self.window
            )));
        }
        Ok(())
    }
}

/// Splits document text into consecutive windows with a fixed overlap.
///
/// Each window starts `window - overlap` characters after the previous one;
/// the remainder shorter than `window` becomes the final chunk. A document
/// shorter than the window yields exactly one chunk.
#[derive(Debug)]
pub struct OverlappingChunker {
    config: ChunkConfig,
}

impl OverlappingChunker {
    /// Create a chunker with the given configuration.
    pub fn new(config: ChunkConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Split one document into chunks. Deterministic for identical input.
    pub fn chunk(&self, document: &FusedDocument) -> Result<Vec<Chunk>> {
        let chars: Vec<char> = document.text.chars().collect();
        if chars.is_empty() {
            return Ok(Vec::new());
        }

        let step = self.config.window - self.config.overlap;
        let mut chunks = Vec::new();
        let mut start = 0;
        let mut sequence_index = 0;

        loop {
            let end = (start + self.config.window).min(chars.len());
            let text: String = chars[start..end].iter().collect();
            chunks.push(Chunk::new(&document.id, text, sequence_index));
            sequence_index += 1;

            if end >= chars.len() {
                break;
            }
            start += step;
            if start >= chars.len() {
                break;
            }
        }

        Ok(chunks)
    }

    /// Split many documents, preserving document order.
    pub fn chunk_all(&self, documents: &[FusedDocument]) -> Result<Vec<Chunk>> {
        let mut chunks = Vec::new();
        for document in documents {
            chunks.extend(self.chunk(document)?);
        }
        tracing::info!(
            "Chunked {} documents into {} chunks (window={}, overlap={})",
            documents.len(),
            chunks.len(),
            self.config.window,
            self.config.overlap
        );
        Ok(chunks)
    }
}

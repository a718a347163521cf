//! # anirec
//!
//! A retrieval-augmented anime recommender.
//!
//! ## Overview
//!
//! anirec turns a tabular anime catalog into a searchable embedding index and
//! answers free-text preference queries with structured, grounded
//! recommendations:
//!
//! - Catalog normalization: raw CSV rows fused into one text document each
//! - Character-window chunking with fixed overlap
//! - Embedding generation behind a pluggable `Embedder` trait
//! - A persistent, exactly-searchable cosine-similarity index
//! - Prompt assembly from retrieved context
//! - Recommendation generation through a `LanguageModel` provider
//!
//! ## Architecture
//!
//! The offline build path runs once per catalog version
//! (`data` → `index`); the online query path serves requests against the
//! persisted index (`retrieval` → `rag`):
//!
//! - `data` - catalog loading, normalization, and chunking
//! - `embedding` - embedder trait and backends
//! - `index` - persistent vector index (build / load / search)
//! - `retrieval` - query validation and top-k similarity retrieval
//! - `rag` - prompt assembly, language-model client, recommendation engine
//! - `cli` - command-line interface
//! - `error` - tagged error taxonomy

pub mod cli;
pub mod data;
pub mod embedding;
pub mod error;
pub mod index;
pub mod rag;
pub mod retrieval;

// Re-export the crate-wide result and error types
pub use error::{Error, ErrorKind, Result};

//! Error taxonomy for the recommender
//!
//! One tagged enum covers every failure the pipeline can surface, split into
//! validation errors (bad input, retry with a different query) and
//! infrastructure errors (index/model unavailable, surface an outage).

use std::path::PathBuf;

/// Convenience alias used throughout the library.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`], so callers can branch on kind
/// instead of matching message strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller supplied bad input; retrying with corrected input can work.
    Validation,
    /// A backing service or artifact failed; retrying the same input won't help.
    Infrastructure,
}

/// All failures the recommender pipeline can produce.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The raw catalog is missing one or more required columns.
    #[error("catalog is missing required columns: {0:?}")]
    Schema(Vec<String>),

    /// Invalid chunking or index parameters.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A prompt template is missing a required placeholder.
    #[error("malformed prompt template '{name}': missing placeholder {placeholder}")]
    Template { name: String, placeholder: String },

    /// No persisted index exists at the given location.
    #[error("no index found at {0}")]
    IndexNotFound(PathBuf),

    /// A persisted index exists but failed integrity checks.
    #[error("index at {path} is corrupt: {reason}")]
    IndexCorrupt { path: PathBuf, reason: String },

    /// Empty or whitespace-only query text.
    #[error("query must not be empty or whitespace")]
    InvalidQuery,

    /// The embedder call failed.
    #[error("embedder call failed: {0}")]
    Embedding(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The language-model call failed.
    #[error("language model call failed: {0}")]
    Generation(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Engine construction failed; wraps the underlying cause.
    #[error("engine initialization failed")]
    Initialization(#[source] Box<Error>),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Classify this error as a validation or infrastructure failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Schema(_)
            | Error::Config(_)
            | Error::Template { .. }
            | Error::InvalidQuery => ErrorKind::Validation,
            Error::IndexNotFound(_)
            | Error::IndexCorrupt { .. }
            | Error::Embedding(_)
            | Error::Generation(_)
            | Error::Io(_)
            | Error::Csv(_)
            | Error::Json(_) => ErrorKind::Infrastructure,
            // Initialization wraps another error; classification follows the cause.
            Error::Initialization(cause) => cause.kind(),
        }
    }

    /// Wrap an engine-construction failure, preserving the cause chain.
    pub fn initialization(cause: Error) -> Self {
        Error::Initialization(Box::new(cause))
    }

    /// Wrap an embedder failure from any error type.
    pub fn embedding<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Embedding(Box::new(source))
    }

    /// Wrap a language-model failure from any error type.
    pub fn generation<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Generation(Box::new(source))
    }
}

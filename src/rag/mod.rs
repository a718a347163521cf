//! Retrieval-augmented recommendation
//!
//! Query-time flow:
//!
//! ```text
//! query text
//!     │  validate (non-blank)
//!     ▼
//! Retriever ── embeds the query, searches the persisted index
//!     │
//!     ▼  ranked chunks
//! ContextBuilder ── newline-joins chunk texts, renders the template
//!     │
//!     ▼  prompt
//! LanguageModel ── chat completion
//!     │
//!     ▼
//! Recommendation (raw answer + sources + timings)
//! ```

pub mod context;
pub mod generator;
pub mod pipeline;

// Re-exports for convenience
pub use context::{ContextBuilder, PromptTemplates, RECOMMENDER_TEMPLATE};
pub use generator::{GroqGenerator, LanguageModel};
pub use pipeline::{Recommendation, Recommender, RecommenderConfig, Source};

//! Language-model capability
//!
//! The engine consumes the model as an opaque completion provider; the
//! concrete client lives in [`groq`].

use crate::error::Result;

pub mod groq;

pub use groq::GroqGenerator;

/// Trait for text-completion providers.
///
/// Implementations are configured out-of-band with a model identifier and an
/// access credential; the engine only ever calls [`complete`].
///
/// [`complete`]: LanguageModel::complete
pub trait LanguageModel: Send + Sync {
    /// Produce a completion for the given prompt text.
    fn complete(&self, prompt: &str) -> Result<String>;

    /// Get the model identifier.
    fn model_name(&self) -> &str;
}

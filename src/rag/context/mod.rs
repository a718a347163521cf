//! Prompt assembly: context formatting and instruction templates.

pub mod builder;
pub mod templates;

pub use builder::ContextBuilder;
pub use templates::{PromptTemplates, RECOMMENDER_TEMPLATE};

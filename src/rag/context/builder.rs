//! Context builder for recommendation prompts
//!
//! Assembles retrieved chunks into the context block and renders the final
//! prompt. Pure functions over their inputs; no I/O.

use crate::retrieval::SearchResult;

use super::templates::{PromptTemplates, CONTEXT_PLACEHOLDER, QUESTION_PLACEHOLDER};

/// Builds prompt context from retrieved chunks.
pub struct ContextBuilder {
    templates: PromptTemplates,
}

impl ContextBuilder {
    /// Create a context builder with the default templates.
    pub fn new() -> Self {
        Self {
            templates: PromptTemplates::default(),
        }
    }

    /// Create a context builder with custom templates.
    pub fn with_templates(templates: PromptTemplates) -> Self {
        Self { templates }
    }

    /// Concatenate retrieved chunk texts, newline-joined, in retrieval order.
    ///
    /// `max_chars` bounds the context size in characters, the same unit the
    /// chunker windows in; a chunk that would overflow the budget is dropped
    /// along with everything after it.
    pub fn build(&self, results: &[SearchResult], max_chars: usize) -> String {
        let mut context = String::new();
        let mut used_chars = 0usize;

        for result in results {
            let text = result.chunk.text.trim();
            let needed = text.chars().count() + usize::from(!context.is_empty());
            if used_chars + needed > max_chars {
                break;
            }
            if !context.is_empty() {
                context.push('\n');
            }
            context.push_str(text);
            used_chars += needed;
        }

        context
    }

    /// Render the named template with the context block and the raw question.
    ///
    /// Deterministic for identical inputs.
    pub fn format_prompt(&self, question: &str, context: &str, template_name: &str) -> String {
        self.templates
            .get(template_name)
            .replace(CONTEXT_PLACEHOLDER, context)
            .replace(QUESTION_PLACEHOLDER, question)
    }

    /// Access to the template set, for validation at engine construction.
    pub fn templates(&self) -> &PromptTemplates {
        &self.templates
    }
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Chunk;
    use crate::rag::context::templates::RECOMMENDER_TEMPLATE;

    fn result(source_id: &str, text: &str, score: f32, rank: usize) -> SearchResult {
        let chunk = Chunk::new(source_id, text.to_string(), 0);
        SearchResult {
            chunk_id: chunk.id.clone(),
            chunk,
            score,
            rank,
        }
    }

    #[test]
    fn test_context_is_newline_joined_in_retrieval_order() {
        let builder = ContextBuilder::new();
        let results = vec![
            result("anime_0", "First chunk", 0.9, 1),
            result("anime_1", "Second chunk", 0.7, 2),
        ];

        let context = builder.build(&results, 1000);
        assert_eq!(context, "First chunk\nSecond chunk");
    }

    #[test]
    fn test_context_respects_char_budget() {
        let builder = ContextBuilder::new();
        let results = vec![
            result("anime_0", "aaaaaaaaaa", 0.9, 1),
            result("anime_1", "bbbbbbbbbb", 0.7, 2),
        ];

        let context = builder.build(&results, 15);
        assert_eq!(context, "aaaaaaaaaa");
    }

    #[test]
    fn test_char_budget_counts_characters_not_bytes() {
        let builder = ContextBuilder::new();
        // 10 characters each, 30 bytes each
        let results = vec![
            result("anime_0", "日本語のアニメです。", 0.9, 1),
            result("anime_1", "学園コメディの物語。", 0.7, 2),
        ];

        // 10 + newline + 10 characters fit exactly
        let context = builder.build(&results, 21);
        assert!(context.contains("日本語のアニメです。"));
        assert!(context.contains("学園コメディの物語。"));

        let tight = builder.build(&results, 20);
        assert!(tight.contains("日本語のアニメです。"));
        assert!(!tight.contains("学園コメディの物語。"));
    }

    #[test]
    fn test_format_prompt_deterministic() {
        let builder = ContextBuilder::new();

        let a = builder.format_prompt("comedy please", "Title: A", RECOMMENDER_TEMPLATE);
        let b = builder.format_prompt("comedy please", "Title: A", RECOMMENDER_TEMPLATE);

        assert_eq!(a, b);
        assert!(a.contains("comedy please"));
        assert!(a.contains("Title: A"));
        assert!(!a.contains(CONTEXT_PLACEHOLDER));
        assert!(!a.contains(QUESTION_PLACEHOLDER));
    }

    #[test]
    fn test_question_passed_unmodified() {
        let builder = ContextBuilder::new();
        let question = "  I liked {weird} input  ";

        let prompt = builder.format_prompt(question, "ctx", RECOMMENDER_TEMPLATE);
        assert!(prompt.contains(question));
    }
}

//! Prompt templates for recommendation generation
//!
//! Static templates with `{context}` and `{question}` placeholders.

use std::collections::HashMap;

use crate::error::{Error, Result};

/// Placeholder for the retrieved context block.
pub const CONTEXT_PLACEHOLDER: &str = "{context}";
/// Placeholder for the raw user question.
pub const QUESTION_PLACEHOLDER: &str = "{question}";

/// Name of the template used by the recommendation engine.
pub const RECOMMENDER_TEMPLATE: &str = "recommender";

/// Named prompt templates.
pub struct PromptTemplates {
    templates: HashMap<String, String>,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        let mut templates = HashMap::new();

        // The recommender instruction: three titles, each with a title, a
        // 2-3 sentence summary, and a preference-match rationale.
        templates.insert(
            RECOMMENDER_TEMPLATE.to_string(),
            concat!(
                "You are an expert anime recommender. Your job is to help users find the ",
                "perfect anime based on their preferences.\n\n",
                "Using the following context, provide a detailed and engaging response to ",
                "the user's question.\n\n",
                "For each question, suggest exactly three anime titles. For each ",
                "recommendation, include:\n",
                "1. The anime title.\n",
                "2. A concise plot summary (2-3 sentences).\n",
                "3. A clear explanation of why this anime matches the user's preferences.\n\n",
                "Present your recommendations in a numbered list format for easy reading.\n\n",
                "If you don't know the answer, respond honestly by saying you don't know ",
                "- do not fabricate any information.\n\n",
                "Context:\n{context}\n\n",
                "User's question:\n{question}\n\n",
                "Your well-structured response:"
            )
            .to_string(),
        );

        // Bare template for debugging retrieval without the persona wrapper
        templates.insert(
            "plain".to_string(),
            concat!(
                "Answer using only this context:\n\n",
                "{context}\n\n",
                "Question: {question}\n",
                "Answer:"
            )
            .to_string(),
        );

        Self { templates }
    }
}

impl PromptTemplates {
    /// Create an empty template collection.
    pub fn new() -> Self {
        Self {
            templates: HashMap::new(),
        }
    }

    /// Get a template by name, falling back to the recommender template.
    pub fn get(&self, name: &str) -> &str {
        self.templates
            .get(name)
            .or_else(|| self.templates.get(RECOMMENDER_TEMPLATE))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Register or replace a template.
    pub fn insert(&mut self, name: &str, template: &str) {
        self.templates.insert(name.to_string(), template.to_string());
    }

    /// Check that a template carries both required placeholders.
    ///
    /// Run once at engine construction; a malformed template is a
    /// [`Error::Template`] and never a per-request failure.
    pub fn validate(&self, name: &str) -> Result<()> {
        let template = self.get(name);
        for placeholder in [CONTEXT_PLACEHOLDER, QUESTION_PLACEHOLDER] {
            if !template.contains(placeholder) {
                return Err(Error::Template {
                    name: name.to_string(),
                    placeholder: placeholder.to_string(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_recommender_template_is_valid() {
        let templates = PromptTemplates::default();
        templates.validate(RECOMMENDER_TEMPLATE).unwrap();

        let template = templates.get(RECOMMENDER_TEMPLATE);
        assert!(template.contains("exactly three anime titles"));
        assert!(template.contains("numbered list"));
        assert!(template.contains("do not fabricate"));
    }

    #[test]
    fn test_unknown_name_falls_back_to_recommender() {
        let templates = PromptTemplates::default();
        assert_eq!(
            templates.get("no-such-template"),
            templates.get(RECOMMENDER_TEMPLATE)
        );
    }

    #[test]
    fn test_missing_placeholder_detected() {
        let mut templates = PromptTemplates::new();
        templates.insert("broken", "Context only: {context}");

        let err = templates.validate("broken").unwrap_err();
        match err {
            Error::Template { placeholder, .. } => {
                assert_eq!(placeholder, QUESTION_PLACEHOLDER);
            }
            other => panic!("expected Template error, got {other:?}"),
        }
    }
}

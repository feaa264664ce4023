//! Fixed question-answering prompt template.
//!
//! The template constrains the model to answer only from the supplied
//! context, to lead yes/no answers with that word, to bullet lists of
//! conditions, and to reproduce [`NOT_AVAILABLE_PHRASE`] verbatim when the
//! context does not contain the answer. The phrase is a soft contract: the
//! system prompts for it, but the model is not guaranteed to obey it
//! byte-for-byte.

use hackrx_core::{AppError, AppResult};
use handlebars::Handlebars;
use std::collections::HashMap;

/// Canonical phrase the model is instructed to return when the requested
/// information is absent from the retrieved context.
pub const NOT_AVAILABLE_PHRASE: &str =
    "The specific detail is not available in the provided information.";

/// Handlebars template for the question-answering prompt.
const QA_TEMPLATE: &str = "\
You are an expert assistant who answers questions about a policy document.
Answer the user's question directly and concisely using only the facts from the provided context.
If the question can be answered with yes or no, begin your answer with \"Yes\" or \"No\".
When the answer is a list of conditions, present the conditions as bullet points.
If the information needed to answer the question is not in the context, reply with exactly: \"{{not_available}}\"

CONTEXT:
{{context}}

QUESTION:
{{question}}

ANSWER:
";

/// Renderer for the fixed question-answering prompt.
///
/// The template is registered once at construction; rendering is a pure
/// substitution of the question and context strings.
#[derive(Debug)]
pub struct QaPrompt {
    handlebars: Handlebars<'static>,
}

impl QaPrompt {
    /// Create the prompt renderer with the fixed template registered.
    pub fn new() -> AppResult<Self> {
        let mut handlebars = Handlebars::new();

        // Plain text output, not HTML
        handlebars.register_escape_fn(handlebars::no_escape);

        handlebars
            .register_template_string("qa", QA_TEMPLATE)
            .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

        Ok(Self { handlebars })
    }

    /// Render the prompt for one question and its retrieved context.
    pub fn render(&self, question: &str, context: &str) -> AppResult<String> {
        let mut variables = HashMap::new();
        variables.insert("question".to_string(), question.to_string());
        variables.insert("context".to_string(), context.to_string());
        variables.insert("not_available".to_string(), NOT_AVAILABLE_PHRASE.to_string());

        self.handlebars
            .render("qa", &variables)
            .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))
    }
}

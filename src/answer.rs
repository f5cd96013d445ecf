//! Answer fetching: prompt the chat model with a question and its context.

use std::sync::Arc;

use crate::llm::{ChatError, ChatModel};
use crate::prompt::build_prompt;

pub struct AnswerFetcher {
    model: Arc<dyn ChatModel>,
}

impl AnswerFetcher {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }

    pub fn model_name(&self) -> &str {
        self.model.model_name()
    }

    /// Build the prompt for `question` over `context` and return the model's
    /// first answer, unmodified.
    pub async fn get_answer(&self, question: &str, context: &[String]) -> Result<String, ChatError> {
        let messages = build_prompt(question, context);
        let answer = self.model.complete(&messages).await?;
        tracing::info!(
            model = self.model_name(),
            passages = context.len(),
            answer_chars = answer.chars().count(),
            "answer received"
        );
        Ok(answer)
    }
}

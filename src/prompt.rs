//! Prompt construction.
//!
//! The model is told to answer from the retrieved context only. The prompt is
//! always two messages: a fixed system instruction and a user message carrying
//! the question followed by the context passages.

use crate::models::ChatMessage;

/// Instruction sent as the system message on every request.
pub const SYSTEM_INSTRUCTION: &str = "I am going to ask you a question, which I would like you to answer \
based only on the provided context, and not any other information. \
If there is not enough information in the context to answer the question, \
say \"I am not sure\", then try to make a guess. \
Break your answer up into nicely readable paragraphs.";

/// Build the `[system, user]` message pair for a question.
///
/// Passages are joined with a single space and nothing else, so passage
/// boundaries are not recoverable from the user message. Empty questions and
/// empty context are passed through as-is.
pub fn build_prompt(question: &str, context: &[String]) -> Vec<ChatMessage> {
    let user = format!(
        "The question is {}. Here is all the context you have:{}",
        question,
        context.join(" ")
    );

    vec![ChatMessage::system(SYSTEM_INSTRUCTION), ChatMessage::user(user)]
}

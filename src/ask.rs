//! One question, start to finish: retrieve → prompt → model.
//!
//! Shared by `chatter ask` and both web routes. Each call is independent;
//! nothing is kept between questions.

use serde::Serialize;

use crate::answer::AnswerFetcher;
use crate::llm::ChatError;
use crate::models::Passage;
use crate::retriever::Retriever;

/// Why a question could not be answered.
#[derive(Debug, thiserror::Error)]
pub enum AskError {
    #[error("retrieval failed: {0:#}")]
    Retrieval(anyhow::Error),

    #[error(transparent)]
    Model(#[from] ChatError),
}

/// The model's answer plus the passages it was grounded on.
#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    pub answer: String,
    pub passages: Vec<Passage>,
}

/// Answer `question` from the `n_results` nearest passages.
///
/// The document texts go to the model in the order the retriever returned
/// them.
pub async fn ask(
    retriever: &dyn Retriever,
    fetcher: &AnswerFetcher,
    question: &str,
    n_results: usize,
) -> Result<Answer, AskError> {
    let result = retriever
        .retrieve(question, n_results)
        .await
        .map_err(AskError::Retrieval)?;

    let context = result.documents();
    tracing::info!(passages = context.len(), "context retrieved");

    let answer = fetcher.get_answer(question, &context).await?;

    Ok(Answer {
        answer,
        passages: result.passages,
    })
}

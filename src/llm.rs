//! Chat-completion client.
//!
//! [`OpenAiChat`] speaks the OpenAI `POST /chat/completions` protocol, which
//! also covers compatible gateways via `llm.base_url`. The credential is
//! handed in at construction; a client built without one refuses every call
//! with [`ChatError::Authentication`] instead of sending an unauthenticated
//! request.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;
use crate::models::ChatMessage;

/// Failures of a chat-completion call.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("model API authentication failed: {0}")]
    Authentication(String),

    #[error("model API request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("model API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("model API returned no answer text")]
    EmptyResponse,

    #[error("model API response could not be decoded: {0}")]
    Decode(String),
}

/// A remote model that continues a role-tagged conversation.
#[async_trait]
pub trait ChatModel: Send + Sync {
    fn model_name(&self) -> &str;

    /// Send `messages` and return the text of the first choice.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ChatError>;
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

pub struct OpenAiChat {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl OpenAiChat {
    pub fn new(config: &LlmConfig, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            api_key,
        }
    }
}

#[async_trait]
impl ChatModel for OpenAiChat {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ChatError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ChatError::Authentication("no API key configured".to_string()))?;

        let request = ChatCompletionRequest {
            model: &self.model,
            messages,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(ChatError::Transport)?;

        let status = response.status();
        let body = response.text().await.map_err(ChatError::Transport)?;

        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(ChatError::Authentication(format!("{}: {}", status, body)));
        }
        if !status.is_success() {
            return Err(ChatError::Api {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(model = %self.model, "chat completion received");
        first_choice_text(&body)
    }
}

/// Pull `choices[0].message.content` out of a response body.
fn first_choice_text(body: &str) -> Result<String, ChatError> {
    let parsed: ChatCompletionResponse =
        serde_json::from_str(body).map_err(|e| ChatError::Decode(e.to_string()))?;

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .ok_or(ChatError::EmptyResponse)
}

//! Core data types that flow between retrieval, prompting and the model call.

use serde::{Deserialize, Serialize};

/// Speaker of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// A role-tagged message, serialised in the chat-completion wire shape
/// (`{"role": "user", "content": "..."}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Fields a collection query should return alongside the passage ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Include {
    pub documents: bool,
    pub metadatas: bool,
    pub distances: bool,
}

impl Include {
    /// Documents and metadata, which is what the question flow asks for.
    pub const DOCUMENTS_AND_METADATAS: Include = Include {
        documents: true,
        metadatas: true,
        distances: false,
    };

    pub const ALL: Include = Include {
        documents: true,
        metadatas: true,
        distances: true,
    };
}

/// One retrieved passage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Passage {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    /// Cosine distance to the query (`1 - similarity`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f32>,
}

/// Passages for a single query, nearest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryResult {
    pub passages: Vec<Passage>,
}

impl QueryResult {
    /// Document texts in result order. Passages stored without text are skipped.
    pub fn documents(&self) -> Vec<String> {
        self.passages
            .iter()
            .filter_map(|p| p.document.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.passages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }
}

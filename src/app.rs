//! Composition root.
//!
//! Builds the long-lived pieces once at start-up: the read-only collection
//! handle (with its query embedder) and the answer fetcher holding the model
//! credential. Both CLI commands and the web server take them from here, and
//! [`Services::shutdown`] releases the database handle.

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::answer::AnswerFetcher;
use crate::collection::Collection;
use crate::config::Config;
use crate::db;
use crate::embedding;
use crate::llm::OpenAiChat;
use crate::retriever::VectorIndex;

pub struct Services {
    pub index: Arc<VectorIndex>,
    pub fetcher: Arc<AnswerFetcher>,
}

impl Services {
    pub async fn start(config: &Config) -> Result<Self> {
        let index = open_index(config).await?;

        let api_key = config.api_key();
        if api_key.is_none() {
            tracing::warn!(
                variable = %config.llm.api_key_env,
                "model API key is not set; questions will fail with an authentication error"
            );
        }
        let chat = OpenAiChat::new(&config.llm, api_key);
        let fetcher = AnswerFetcher::new(Arc::new(chat));

        Ok(Self {
            index: Arc::new(index),
            fetcher: Arc::new(fetcher),
        })
    }

    pub async fn shutdown(&self) {
        self.index.close().await;
        tracing::info!("collection store closed");
    }
}

/// Open the configured collection with a matching query embedder.
pub async fn open_index(config: &Config) -> Result<VectorIndex> {
    let pool = db::connect(config).await?;
    let collection = Collection::open(pool, &config.collection.name)
        .await
        .with_context(|| {
            format!(
                "failed to open collection '{}' in {}",
                config.collection.name,
                config.collection.path.display()
            )
        })?;

    let embedder = embedding::create_embedder(&config.embedding, config.api_key())?;

    tracing::info!(
        collection = collection.name(),
        path = %config.collection.path.display(),
        embedder = embedder.model_name(),
        "collection opened"
    );

    Ok(VectorIndex::new(collection, embedder))
}

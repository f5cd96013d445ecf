//! The retrieval seam used by the question flow.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;

use crate::collection::Collection;
use crate::embedding::{self, Embedder};
use crate::models::{Include, QueryResult};

/// Maps a query string to its most similar stored passages.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Return up to `n_results` passages, nearest first, with document text
    /// and metadata.
    async fn retrieve(&self, query: &str, n_results: usize) -> Result<QueryResult>;
}

/// A [`Collection`] searched with query vectors from an [`Embedder`].
pub struct VectorIndex {
    collection: Collection,
    embedder: Arc<dyn Embedder>,
}

impl VectorIndex {
    pub fn new(collection: Collection, embedder: Arc<dyn Embedder>) -> Self {
        if let Some(recorded) = collection.embedding_model() {
            if recorded != embedder.model_name() {
                tracing::warn!(
                    collection = collection.name(),
                    recorded,
                    configured = embedder.model_name(),
                    "collection was embedded with a different model; results may be meaningless"
                );
            }
        }
        Self {
            collection,
            embedder,
        }
    }

    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    /// Embed `query` and return its `n_results` nearest passages.
    pub async fn search(
        &self,
        query: &str,
        n_results: usize,
        include: Include,
    ) -> Result<QueryResult> {
        let query_vec = embedding::embed_query(self.embedder.as_ref(), query)
            .await
            .context("failed to embed query")?;

        let result = self.collection.query(&query_vec, n_results, include).await?;

        tracing::debug!(
            collection = self.collection.name(),
            requested = n_results,
            returned = result.len(),
            "retrieved passages"
        );

        Ok(result)
    }

    /// Release the database handle.
    pub async fn close(&self) {
        self.collection.close().await;
    }
}

#[async_trait]
impl Retriever for VectorIndex {
    async fn retrieve(&self, query: &str, n_results: usize) -> Result<QueryResult> {
        self.search(query, n_results, Include::DOCUMENTS_AND_METADATAS)
            .await
    }
}

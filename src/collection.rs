//! Read-only access to a named vector collection.
//!
//! A [`Collection`] is a handle to one named collection inside the store
//! opened by [`db::connect`](crate::db::connect). Queries are brute-force:
//! every stored embedding is scored by cosine similarity against the query
//! vector and the best `n_results` are returned, nearest first.

use anyhow::{bail, Result};
use sqlx::{Row, SqlitePool};

use crate::embedding;
use crate::models::{Include, Passage, QueryResult};

pub struct Collection {
    pool: SqlitePool,
    id: i64,
    name: String,
    embedding_model: Option<String>,
    dims: usize,
}

impl Collection {
    /// Look up a collection by name.
    pub async fn open(pool: SqlitePool, name: &str) -> Result<Self> {
        let row = sqlx::query("SELECT id, embedding_model, dims FROM collections WHERE name = ?")
            .bind(name)
            .fetch_optional(&pool)
            .await?;

        let row = match row {
            Some(row) => row,
            None => bail!("collection not found: {}", name),
        };

        let dims: i64 = row.try_get("dims")?;

        Ok(Self {
            pool,
            id: row.try_get("id")?,
            name: name.to_string(),
            embedding_model: row.try_get("embedding_model")?,
            dims: dims.max(0) as usize,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Model the collection was embedded with, if the indexer recorded it.
    pub fn embedding_model(&self) -> Option<&str> {
        self.embedding_model.as_deref()
    }

    pub fn dims(&self) -> usize {
        self.dims
    }

    /// Number of stored passages.
    pub async fn count(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM documents WHERE collection_id = ?")
            .bind(self.id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("n")?)
    }

    /// Return the `n_results` passages nearest to `query_embedding`.
    ///
    /// Ties keep insertion order. Fewer passages come back when the
    /// collection holds fewer than `n_results`.
    pub async fn query(
        &self,
        query_embedding: &[f32],
        n_results: usize,
        include: Include,
    ) -> Result<QueryResult> {
        if self.dims > 0 && query_embedding.len() != self.dims {
            bail!(
                "query embedding has {} dimensions, collection '{}' stores {}",
                query_embedding.len(),
                self.name,
                self.dims
            );
        }

        let rows = sqlx::query(
            r#"
            SELECT id, document, metadata_json, embedding
            FROM documents
            WHERE collection_id = ?
            ORDER BY seq ASC
            "#,
        )
        .bind(self.id)
        .fetch_all(&self.pool)
        .await?;

        let mut scored: Vec<(f32, &sqlx::sqlite::SqliteRow)> = Vec::with_capacity(rows.len());
        for row in &rows {
            let blob: Vec<u8> = row.try_get("embedding")?;
            let vec = embedding::blob_to_vec(&blob);
            scored.push((embedding::cosine_similarity(query_embedding, &vec), row));
        }

        // Stable sort, so equal scores stay in seq order.
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(n_results);

        let mut passages = Vec::with_capacity(scored.len());
        for (similarity, row) in scored {
            let metadata = if include.metadatas {
                let raw: Option<String> = row.try_get("metadata_json")?;
                Some(
                    raw.and_then(|s| serde_json::from_str(&s).ok())
                        .unwrap_or_else(|| serde_json::json!({})),
                )
            } else {
                None
            };

            passages.push(Passage {
                id: row.try_get("id")?,
                document: if include.documents {
                    row.try_get("document")?
                } else {
                    None
                },
                metadata,
                distance: include.distances.then_some(1.0 - similarity),
            });
        }

        Ok(QueryResult { passages })
    }

    /// Close the underlying pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

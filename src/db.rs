use anyhow::{bail, Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::config::Config;

/// Layout of a collection file, as written by the indexer.
///
/// Embeddings are stored as little-endian f32 blobs (see
/// [`vec_to_blob`](crate::embedding::vec_to_blob)); `seq` preserves insertion
/// order and breaks similarity ties.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS collections (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    embedding_model TEXT,
    dims INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS documents (
    collection_id INTEGER NOT NULL REFERENCES collections(id),
    id TEXT NOT NULL,
    seq INTEGER NOT NULL,
    document TEXT,
    metadata_json TEXT,
    embedding BLOB NOT NULL,
    PRIMARY KEY (collection_id, id)
);

CREATE INDEX IF NOT EXISTS idx_documents_seq ON documents(collection_id, seq);
"#;

/// Open the collection file read-only.
///
/// The file must already exist; this process never creates or writes it.
pub async fn connect(config: &Config) -> Result<SqlitePool> {
    let db_path = config.collection.db_file();

    if !db_path.is_file() {
        bail!("collection store not found: {}", db_path.display());
    }

    let options = SqliteConnectOptions::new()
        .filename(&db_path)
        .read_only(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .with_context(|| format!("Failed to open collection store: {}", db_path.display()))?;

    Ok(pool)
}

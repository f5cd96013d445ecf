#![allow(dead_code)]

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::{Arc, Mutex};

use doc_chat::config::COLLECTION_FILE;
use doc_chat::db::SCHEMA;
use doc_chat::embedding::vec_to_blob;

pub const TEST_KEY: &str = "sk-integration";

/// Write a collection file with the given `(id, text, vector)` rows, in order.
pub async fn seed_collection(dir: &Path, name: &str, rows: &[(&str, &str, [f32; 2])]) {
    std::fs::create_dir_all(dir).unwrap();
    let options = SqliteConnectOptions::new()
        .filename(dir.join(COLLECTION_FILE))
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .unwrap();

    sqlx::raw_sql(SCHEMA).execute(&pool).await.unwrap();
    sqlx::query(
        "INSERT INTO collections (id, name, embedding_model, dims) VALUES (1, ?, 'nomic-embed-text', 2)",
    )
    .bind(name)
    .execute(&pool)
    .await
    .unwrap();

    for (seq, (id, text, vector)) in rows.iter().enumerate() {
        sqlx::query(
            "INSERT INTO documents (collection_id, id, seq, document, metadata_json, embedding) VALUES (1, ?, ?, ?, ?, ?)",
        )
        .bind(*id)
        .bind(seq as i64)
        .bind(*text)
        .bind(json!({ "source": format!("{}.txt", id) }).to_string())
        .bind(vec_to_blob(vector))
        .execute(&pool)
        .await
        .unwrap();
    }

    pool.close().await;
}

/// Seven passages; the mock embedder maps every query to `[1, 0]`, so the
/// nearest five are `doc1`..`doc5` in that order.
pub const PASSAGES: &[(&str, &str, [f32; 2])] = &[
    ("doc6", "Sixth.", [0.2, 1.0]),
    ("doc1", "Doc1 text.", [1.0, 0.0]),
    ("doc7", "Seventh.", [-1.0, 0.0]),
    ("doc2", "Doc2 text.", [1.0, 0.1]),
    ("doc3", "Doc3 text.", [1.0, 0.3]),
    ("doc4", "Doc4 text.", [1.0, 0.5]),
    ("doc5", "Doc5 text.", [1.0, 0.8]),
];

/// How the mock chat endpoint replies.
#[derive(Clone)]
pub enum ChatReply {
    Answer(String),
    Status(u16, String),
    NoChoices,
}

/// Stand-in for both remote collaborators: Ollama-style `/api/embed` and an
/// OpenAI-style `/v1/chat/completions`.
#[derive(Clone)]
pub struct MockUpstream {
    pub addr: SocketAddr,
    pub chat_requests: Arc<Mutex<Vec<Value>>>,
    pub auth_headers: Arc<Mutex<Vec<Option<String>>>>,
}

#[derive(Clone)]
struct MockState {
    reply: ChatReply,
    chat_requests: Arc<Mutex<Vec<Value>>>,
    auth_headers: Arc<Mutex<Vec<Option<String>>>>,
}

impl MockUpstream {
    pub async fn start(reply: ChatReply) -> Self {
        let chat_requests = Arc::new(Mutex::new(Vec::new()));
        let auth_headers = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            reply,
            chat_requests: chat_requests.clone(),
            auth_headers: auth_headers.clone(),
        };

        let app = Router::new()
            .route("/api/embed", post(mock_embed))
            .route("/v1/chat/completions", post(mock_chat))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            chat_requests,
            auth_headers,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn chat_base_url(&self) -> String {
        format!("http://{}/v1", self.addr)
    }

    pub fn chat_requests(&self) -> Vec<Value> {
        self.chat_requests.lock().unwrap().clone()
    }

    pub fn auth_headers(&self) -> Vec<Option<String>> {
        self.auth_headers.lock().unwrap().clone()
    }
}

async fn mock_embed(Json(body): Json<Value>) -> Json<Value> {
    let n = body["input"].as_array().map(|a| a.len()).unwrap_or(0);
    let embeddings: Vec<Value> = (0..n).map(|_| json!([1.0, 0.0])).collect();
    Json(json!({ "embeddings": embeddings }))
}

async fn mock_chat(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.auth_headers.lock().unwrap().push(
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string()),
    );
    state.chat_requests.lock().unwrap().push(body);

    match state.reply {
        ChatReply::Answer(text) => (
            StatusCode::OK,
            Json(json!({
                "id": "chatcmpl-test",
                "object": "chat.completion",
                "choices": [
                    { "index": 0, "message": { "role": "assistant", "content": text }, "finish_reason": "stop" }
                ]
            })),
        ),
        ChatReply::Status(code, message) => (
            StatusCode::from_u16(code).unwrap(),
            Json(json!({ "error": { "message": message } })),
        ),
        ChatReply::NoChoices => (StatusCode::OK, Json(json!({ "choices": [] }))),
    }
}

/// Config file text pointing at the mock upstream and a collection directory.
pub fn config_toml(collection_dir: &Path, upstream: &MockUpstream, key_env: &str) -> String {
    format!(
        r#"[collection]
path = "{}"
name = "SS123"

[embedding]
provider = "ollama"
model = "nomic-embed-text"
url = "{}"

[llm]
model = "gpt-3.5-turbo"
base_url = "{}"
api_key_env = "{}"

[server]
bind = "127.0.0.1:0"
"#,
        collection_dir.display(),
        upstream.base_url(),
        upstream.chat_base_url(),
        key_env
    )
}

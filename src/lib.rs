//! # doc-chat
//!
//! Ask questions about a document collection. The question is embedded,
//! the five nearest passages are pulled from a persistent vector collection,
//! and a hosted chat model answers from those passages only.
//!
//! ## Architecture
//!
//! ```text
//!  question ──▶ Retriever ──▶ prompt ──▶ ChatModel ──▶ answer
//!               (SQLite +     [system,    (OpenAI
//!                embedder)     user]       chat API)
//! ```
//!
//! Everything long-lived (the collection handle, the model credential) is
//! built once by [`app::Services`] and passed down explicitly.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration and defaults |
//! | [`models`] | Messages, passages, query results |
//! | [`prompt`] | Two-message prompt construction |
//! | [`db`] | Read-only collection store connection |
//! | [`collection`] | Nearest-neighbour queries over one collection |
//! | [`embedding`] | Query embedding providers and vector utilities |
//! | [`retriever`] | Retrieval trait and the vector-index implementation |
//! | [`llm`] | Chat-completion client |
//! | [`answer`] | Prompt + model call |
//! | [`ask`] | Retrieve-then-answer pipeline |
//! | [`app`] | Start-up wiring |
//! | [`page`] | HTML rendering |
//! | [`server`] | Web server |

pub mod answer;
pub mod app;
pub mod ask;
pub mod collection;
pub mod config;
pub mod db;
pub mod embedding;
pub mod llm;
pub mod models;
pub mod page;
pub mod prompt;
pub mod retriever;
pub mod server;

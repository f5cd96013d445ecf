//! # doc-chat CLI (`chatter`)
//!
//! ```bash
//! chatter [--config ./chatter.toml] <command>
//! ```
//!
//! | Command | Description |
//! |---------|-------------|
//! | `chatter serve` | Start the web form |
//! | `chatter ask "<question>"` | Answer one question in the terminal |
//! | `chatter search "<question>"` | Show the passages a question would retrieve |
//! | `chatter info` | Show the configured collection |
//!
//! Without `--config` the built-in defaults are used (collection `SS123`
//! under `documents/SS123`, model `gpt-3.5-turbo`). A `.env` file in the
//! working directory or any parent is loaded first, so `OPENAI_API_KEY` can
//! live there.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use doc_chat::app::{self, Services};
use doc_chat::ask::ask;
use doc_chat::config;
use doc_chat::models::Include;
use doc_chat::server;

/// Ask questions about a document collection.
#[derive(Parser)]
#[command(
    name = "chatter",
    about = "Chat with your document: vector retrieval plus a hosted chat model",
    version
)]
struct Cli {
    /// Path to a TOML configuration file. Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web form on `[server].bind`.
    Serve,

    /// Answer a single question and print the result.
    Ask {
        /// The question.
        question: String,

        /// Number of passages to retrieve (defaults to `[retrieval].n_results`).
        #[arg(long, value_parser = parse_limit)]
        limit: Option<usize>,

        /// Also print the passages the answer was grounded on.
        #[arg(long)]
        show_context: bool,
    },

    /// Print the passages nearest to a question, with distances.
    Search {
        /// The question.
        question: String,

        /// Number of passages to show (defaults to `[retrieval].n_results`).
        #[arg(long, value_parser = parse_limit)]
        limit: Option<usize>,
    },

    /// Show the configured collection and how many passages it holds.
    Info,
}

/// Passage counts must be at least 1, matching `[retrieval].n_results`.
fn parse_limit(raw: &str) -> Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "doc_chat=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let cfg = config::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Ask {
            question,
            limit,
            show_context,
        } => {
            let services = Services::start(&cfg).await?;
            let n_results = limit.unwrap_or(cfg.retrieval.n_results);
            let outcome = ask(
                services.index.as_ref(),
                &services.fetcher,
                &question,
                n_results,
            )
            .await;
            services.shutdown().await;

            let answer = outcome?;
            println!("{}", answer.answer);
            if show_context {
                println!();
                for (i, passage) in answer.passages.iter().enumerate() {
                    println!(
                        "[{}] {}: {}",
                        i + 1,
                        passage.id,
                        passage.document.as_deref().unwrap_or("")
                    );
                }
            }
        }
        Commands::Search { question, limit } => {
            let index = app::open_index(&cfg).await?;
            let n_results = limit.unwrap_or(cfg.retrieval.n_results);
            let outcome = index.search(&question, n_results, Include::ALL).await;
            index.close().await;

            let result = outcome?;
            if result.is_empty() {
                println!("No results.");
            }
            for (i, passage) in result.passages.iter().enumerate() {
                println!(
                    "{}. {} (distance {:.4})",
                    i + 1,
                    passage.id,
                    passage.distance.unwrap_or_default()
                );
                if let Some(metadata) = &passage.metadata {
                    println!("   metadata: {}", metadata);
                }
                println!("   {}", passage.document.as_deref().unwrap_or(""));
            }
        }
        Commands::Info => {
            let index = app::open_index(&cfg).await?;
            let collection = index.collection();
            let count = collection.count().await;

            println!("collection: {}", collection.name());
            println!("path: {}", cfg.collection.path.display());
            println!(
                "embedding model: {}",
                collection.embedding_model().unwrap_or("(not recorded)")
            );
            println!("dims: {}", collection.dims());
            index.close().await;
            println!("passages: {}", count?);
        }
    }

    Ok(())
}

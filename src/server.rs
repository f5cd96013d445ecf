//! Web front end.
//!
//! One page with one form, plus a JSON twin of the form for scripts.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/` | Question form, pre-filled with the default question |
//! | `POST` | `/` | Form submission; re-renders the page with the answer |
//! | `POST` | `/api/ask` | `{"question": "..."}` → `{"answer": "...", "passages": [...]}` |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! JSON errors use the shape
//!
//! ```json
//! { "error": { "code": "llm_auth", "message": "model API authentication failed: ..." } }
//! ```
//!
//! Codes: `bad_request` (400), `retrieval_failed` (500), `llm_auth` (502),
//! `llm_unavailable` (502), `llm_error` (502), `llm_empty_response` (502).
//! The form route shows the same message in the response area.

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::answer::AnswerFetcher;
use crate::app::Services;
use crate::ask::{ask, Answer, AskError};
use crate::config::{Config, UiConfig};
use crate::llm::ChatError;
use crate::page;
use crate::retriever::Retriever;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    retriever: Arc<dyn Retriever>,
    fetcher: Arc<AnswerFetcher>,
    ui: Arc<UiConfig>,
    n_results: usize,
}

impl AppState {
    pub fn new(
        retriever: Arc<dyn Retriever>,
        fetcher: Arc<AnswerFetcher>,
        ui: UiConfig,
        n_results: usize,
    ) -> Self {
        Self {
            retriever,
            fetcher,
            ui: Arc::new(ui),
            n_results,
        }
    }
}

/// Build the router. Exposed so tests can serve it on an ephemeral port.
///
/// No CORS headers are sent: the page posts to its own origin, and other
/// sites must not be able to read answers or passages.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handle_page).post(handle_form))
        .route("/api/ask", post(handle_api_ask))
        .route("/health", get(handle_health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the web server on `[server].bind` and serve until Ctrl-C.
///
/// The collection store is opened before binding and closed after the
/// server has drained.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let services = Services::start(config).await?;

    let state = AppState::new(
        services.index.clone(),
        services.fetcher.clone(),
        config.ui.clone(),
        config.retrieval.n_results,
    );
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    tracing::info!(bind = %config.server.bind, "server listening");
    println!("Serving on http://{}", config.server.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    services.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// Error that converts into a JSON HTTP response.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code.to_string(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request",
        message: message.into(),
    }
}

impl From<AskError> for AppError {
    fn from(err: AskError) -> Self {
        let (status, code) = match &err {
            AskError::Retrieval(_) => (StatusCode::INTERNAL_SERVER_ERROR, "retrieval_failed"),
            AskError::Model(ChatError::Authentication(_)) => (StatusCode::BAD_GATEWAY, "llm_auth"),
            AskError::Model(ChatError::Transport(_)) => (StatusCode::BAD_GATEWAY, "llm_unavailable"),
            AskError::Model(ChatError::EmptyResponse) => {
                (StatusCode::BAD_GATEWAY, "llm_empty_response")
            }
            AskError::Model(ChatError::Api { .. } | ChatError::Decode(_)) => {
                (StatusCode::BAD_GATEWAY, "llm_error")
            }
        };
        tracing::error!(code, error = %err, "question failed");
        AppError {
            status,
            code,
            message: err.to_string(),
        }
    }
}

fn check_length(ui: &UiConfig, question: &str) -> Result<(), AppError> {
    let chars = question.chars().count();
    if chars > ui.max_chars {
        return Err(bad_request(format!(
            "question must be at most {} characters (got {})",
            ui.max_chars, chars
        )));
    }
    Ok(())
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ GET / and POST / ============

#[derive(Deserialize)]
struct AskForm {
    #[serde(default)]
    question: String,
}

async fn handle_page(State(state): State<AppState>) -> Html<String> {
    Html(page::render(
        &state.ui,
        &state.ui.default_question,
        &page::Response::Idle,
    ))
}

async fn handle_form(State(state): State<AppState>, Form(form): Form<AskForm>) -> Response {
    let outcome = match check_length(&state.ui, &form.question) {
        Ok(()) => ask(
            state.retriever.as_ref(),
            &state.fetcher,
            &form.question,
            state.n_results,
        )
        .await
        .map_err(AppError::from),
        Err(e) => Err(e),
    };

    match outcome {
        Ok(answer) => Html(page::render(
            &state.ui,
            &form.question,
            &page::Response::Answer(answer.answer),
        ))
        .into_response(),
        Err(e) => (
            e.status,
            Html(page::render(
                &state.ui,
                &form.question,
                &page::Response::Error(e.message),
            )),
        )
            .into_response(),
    }
}

// ============ POST /api/ask ============

#[derive(Deserialize)]
struct AskRequest {
    question: String,
}

async fn handle_api_ask(
    State(state): State<AppState>,
    Json(request): Json<AskRequest>,
) -> Result<Json<Answer>, AppError> {
    check_length(&state.ui, &request.question)?;

    let answer = ask(
        state.retriever.as_ref(),
        &state.fetcher,
        &request.question,
        state.n_results,
    )
    .await?;

    Ok(Json(answer))
}

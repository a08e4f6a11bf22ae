//! HTTP query endpoint consumed by the chat UI.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/query` | Answer a natural-language query |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error contract
//!
//! Every failure returns a JSON body `{ "error": "<message>" }`: a missing
//! or empty prompt is a 400, any pipeline failure is a 500. CORS permits
//! all origins, methods, and headers for browser-based clients.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::blocks::{build_response, QueryResponse};
use crate::config::Config;
use crate::pipeline::QueryPipeline;

#[derive(Clone)]
struct AppState {
    pipeline: Arc<QueryPipeline>,
}

/// Assemble the application router. Split out from [`run_server`] so tests
/// can serve it on an ephemeral port.
pub fn app(pipeline: Arc<QueryPipeline>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/query", post(handle_query))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(AppState { pipeline })
}

/// Start the query server. Runs until the process is terminated.
pub async fn run_server(config: &Config, pipeline: Arc<QueryPipeline>) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();

    info!(addr = %bind_addr, "query server listening");

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app(pipeline)).await?;

    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

struct AppError {
    status: StatusCode,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        message: message.into(),
    }
}

fn internal_error(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        message: message.into(),
    }
}

// ============ POST /api/query ============

#[derive(Deserialize)]
struct QueryRequest {
    prompt: Option<String>,
    #[serde(rename = "sessionId", default = "default_session_id")]
    session_id: String,
}

fn default_session_id() -> String {
    "default".to_string()
}

async fn handle_query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, AppError> {
    let prompt = match request.prompt.as_deref() {
        Some(p) if !p.trim().is_empty() => p,
        _ => return Err(bad_request("Prompt is required")),
    };

    let outcome = state
        .pipeline
        .answer(&request.session_id, prompt)
        .await
        .map_err(|e| {
            error!(error = %e, session_id = %request.session_id, "query failed");
            internal_error(e.to_string())
        })?;

    Ok(Json(build_response(&outcome.answer, &outcome.context)))
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

//! HTTP API surface.
//!
//! One protected endpoint, `POST /api/v1/hackrx/run`, answers a batch of
//! questions about the ingested document, plus an unauthenticated health
//! probe at `GET /`. Errors are returned as `{"detail": "..."}` bodies;
//! internal failure details stay in the logs.

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use hackrx_core::AppResult;
use hackrx_rag::QaEngine;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<QaEngine>,
    pub team_token: Arc<str>,
}

/// Body of the run endpoint.
#[derive(Debug, Deserialize)]
pub struct RunRequest {
    /// URL of the source document; ingestion happens out of band, so this is
    /// recorded but not fetched at question time
    pub documents: String,

    /// Questions to answer, in the order the answers should come back
    pub questions: Vec<String>,
}

/// Response of the run endpoint: one answer per question, input order.
#[derive(Debug, Serialize, Deserialize)]
pub struct RunResponse {
    pub answers: Vec<String>,
}

/// An error that renders as an HTTP status plus a `{"detail": ...}` body.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    fn unauthorized() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            detail: "Invalid or missing authentication token".to_string(),
        }
    }

    fn validation(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            detail: detail.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "detail": self.detail }));
        (self.status, body).into_response()
    }
}

/// Check the Authorization header against the configured team token.
///
/// The header must match `Bearer <token>` exactly; the response does not
/// distinguish a missing header from a wrong token.
fn authorize(headers: &HeaderMap, team_token: &str) -> Result<(), ApiError> {
    let expected = format!("Bearer {}", team_token);

    match headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        Some(value) if value == expected => Ok(()),
        _ => Err(ApiError::unauthorized()),
    }
}

/// `POST /api/v1/hackrx/run`
pub async fn run(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<RunRequest>,
) -> Result<Json<RunResponse>, ApiError> {
    // Auth first, before any validation leaks request shape
    authorize(&headers, &state.team_token)?;

    if request.questions.is_empty() {
        return Err(ApiError::validation("questions must not be empty"));
    }

    tracing::info!(
        "Run request: {} questions about {}",
        request.questions.len(),
        request.documents.split('?').next().unwrap_or(""),
    );

    let answers = state.engine.answer_all(&request.questions).await;

    Ok(Json(RunResponse { answers }))
}

/// `GET /` health probe.
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Build the router with all routes attached.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/api/v1/hackrx/run", post(run))
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(
    host: &str,
    port: u16,
    engine: Arc<QaEngine>,
    team_token: String,
) -> AppResult<()> {
    let state = AppState {
        engine,
        team_token: Arc::from(team_token),
    };

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Listening on {}", addr);

    axum::serve(listener, router(state)).await?;

    Ok(())
}

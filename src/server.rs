//! Thin HTTP wrapper over a persisted pipeline state.
//!
//! Serves the cheap re-rank phase only; running the pipeline stays a batch
//! job. The state file is re-read on every request so a newer pipeline run
//! is picked up without restarting the server - acceptable because the
//! document is small and requests are infrequent.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::PipelineError;
use crate::pipeline::PipelineState;

/// Upper bound on requested seed counts.
const MAX_TOP_K: usize = 500;

struct ServerState {
    state_path: PathBuf,
}

type ApiError = (StatusCode, Json<Value>);

/// Run the re-rank API until the process is stopped.
pub async fn serve(addr: SocketAddr, state_path: PathBuf) -> Result<()> {
    let shared = Arc::new(ServerState { state_path });
    let app = Router::new()
        .route("/health", get(health))
        .route("/issues", get(issues))
        .route("/rank/{issue}", get(rank))
        .with_state(shared);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "serving re-rank API");
    axum::serve(listener, app).await.context("server error")
}

fn internal_error(err: anyhow::Error) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": err.to_string() })),
    )
}

fn load_state(shared: &ServerState) -> Result<PipelineState, ApiError> {
    PipelineState::load(&shared.state_path).map_err(internal_error)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn issues(State(shared): State<Arc<ServerState>>) -> Result<Json<Value>, ApiError> {
    let state = load_state(&shared)?;
    Ok(Json(json!({ "issues": state.issues })))
}

#[derive(Debug, Deserialize)]
struct RankParams {
    #[serde(default = "default_top_k")]
    top_k: usize,
    #[serde(default = "default_diverse")]
    diverse: bool,
}

fn default_top_k() -> usize {
    25
}

fn default_diverse() -> bool {
    true
}

async fn rank(
    State(shared): State<Arc<ServerState>>,
    Path(issue): Path<String>,
    Query(params): Query<RankParams>,
) -> Result<Json<Value>, ApiError> {
    if params.top_k == 0 || params.top_k > MAX_TOP_K {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": format!("top_k must be between 1 and {MAX_TOP_K}") })),
        ));
    }

    let state = load_state(&shared)?;
    match state.rank_issue(&issue, params.top_k, params.diverse) {
        Ok(seeds) => Ok(Json(json!({
            "issue": issue,
            "top_k": params.top_k,
            "diverse": params.diverse,
            "seeds": seeds,
        }))),
        Err(err) => match err.downcast_ref::<PipelineError>() {
            Some(PipelineError::IssueNotFound(_)) => Err((
                StatusCode::NOT_FOUND,
                Json(json!({ "error": err.to_string() })),
            )),
            _ => Err(internal_error(err)),
        },
    }
}

use crate::app::dto::*;
use crate::app::engine::LinkageEngine;
use anyhow::Result;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::spawn_blocking;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

#[derive(Clone)]
pub struct HttpState {
    pub engine: LinkageEngine,
}

#[derive(Debug, Clone, Serialize)]
struct ApiErrorBody {
    error: String,
}

fn api_error(status: StatusCode, msg: impl Into<String>) -> impl IntoResponse {
    (status, Json(ApiErrorBody { error: msg.into() }))
}

pub fn build_router(engine: LinkageEngine) -> Router {
    let state = Arc::new(HttpState { engine });

    Router::new()
        .route("/health", get(health))
        .route("/linkage", post(linkage))
        .route("/graph", post(graph))
        .route("/direct", post(direct))
        .route("/tree", post(tree))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

pub async fn serve(engine: LinkageEngine, addr: SocketAddr) -> Result<()> {
    let app = build_router(engine);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}

/// Runs a blocking engine call off the async runtime and maps failures to
/// `400` (request could not be served) or `500` (task failure).
async fn run_blocking<T, F>(f: F) -> axum::response::Response
where
    T: Serialize + Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    match spawn_blocking(f).await {
        Ok(Ok(res)) => Json(res).into_response(),
        Ok(Err(e)) => api_error(StatusCode::BAD_REQUEST, format!("{e:#}")).into_response(),
        Err(e) => api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("task join error: {e}"),
        )
        .into_response(),
    }
}

async fn health(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    Json(state.engine.health())
}

async fn linkage(
    State(state): State<Arc<HttpState>>,
    Json(req): Json<LinkageRequest>,
) -> impl IntoResponse {
    let engine = state.engine.clone();
    run_blocking(move || engine.linkage(req)).await
}

async fn graph(
    State(state): State<Arc<HttpState>>,
    Json(req): Json<GraphRequest>,
) -> impl IntoResponse {
    let engine = state.engine.clone();
    run_blocking(move || engine.graph(req)).await
}

async fn direct(
    State(state): State<Arc<HttpState>>,
    Json(req): Json<ArtifactRequest>,
) -> impl IntoResponse {
    let engine = state.engine.clone();
    run_blocking(move || engine.direct(req)).await
}

async fn tree(
    State(state): State<Arc<HttpState>>,
    Json(req): Json<ArtifactRequest>,
) -> impl IntoResponse {
    let engine = state.engine.clone();
    run_blocking(move || engine.tree(req)).await
}

//! HTTP front end: a search UI, a JSON search API and an admin hook that
//! re-crawls the site and swaps in the new index.

pub mod pipeline;
pub mod render;

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use pipeline::{BuildReport, Pipeline};
use serde::{Deserialize, Serialize};
use sitesearch_core::query::score_documents;
use sitesearch_core::{search, IndexHandle, ScoredResult, DEFAULT_LIMIT};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

const MAX_K: usize = 100;

#[derive(Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    #[serde(default = "default_k")]
    pub k: usize,
}
fn default_k() -> usize { DEFAULT_LIMIT }

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<ScoredResult>,
}

#[derive(Clone)]
pub struct AppState {
    pub index: IndexHandle,
    pub pipeline: Option<Arc<Pipeline>>,
    pub admin_token: Option<String>,
    /// Held while a rebuild runs so rebuilds never overlap.
    pub rebuilding: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(index: IndexHandle) -> Self {
        Self { index, pipeline: None, admin_token: None, rebuilding: Arc::new(Mutex::new(())) }
    }

    pub fn with_pipeline(mut self, pipeline: Pipeline) -> Self {
        self.pipeline = Some(Arc::new(pipeline));
        self
    }

    pub fn with_admin_token(mut self, token: Option<String>) -> Self {
        self.admin_token = token;
        self
    }
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(home_handler))
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_page_handler))
        .route("/api/search", get(search_handler))
        .route("/admin/reindex", post(reindex_handler))
        .with_state(state)
        .layer(cors_from_env())
        .layer(TraceLayer::new_for_http())
}

/// CORS_ALLOW_ORIGIN (comma-separated) restricts origins; any origin otherwise.
fn cors_from_env() -> CorsLayer {
    let base = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    let origins: Vec<_> = std::env::var("CORS_ALLOW_ORIGIN")
        .unwrap_or_default()
        .split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect();
    if origins.is_empty() {
        base.allow_origin(Any)
    } else {
        base.allow_origin(AllowOrigin::list(origins))
    }
}

async fn home_handler(State(state): State<AppState>) -> Html<String> {
    Html(render::home(state.index.snapshot().num_docs()))
}

pub async fn search_page_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Html<String> {
    let q = params.q.trim();
    if q.is_empty() {
        return Html(render::home(state.index.snapshot().num_docs()));
    }
    let results = state.index.search(q, params.k.clamp(1, MAX_K));
    tracing::info!(query = q, results = results.len(), "search page");
    Html(render::results(q, &results))
}

pub async fn search_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Json<SearchResponse> {
    let start = std::time::Instant::now();
    let index = state.index.snapshot();
    let total_hits = score_documents(&index, &params.q).len();
    let results = search(&index, &params.q, params.k.clamp(1, MAX_K));
    let took_s = start.elapsed().as_secs_f64();
    tracing::debug!(query = %params.q, total_hits, took_s, "api search");
    Json(SearchResponse { query: params.q, took_s, total_hits, results })
}

async fn reindex_handler(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<BuildReport>, Response> {
    authorize(&state, &headers).map_err(IntoResponse::into_response)?;
    let Some(pipeline) = state.pipeline.clone() else {
        return Err((StatusCode::NOT_IMPLEMENTED, "no crawl source configured").into_response());
    };
    let Ok(_guard) = state.rebuilding.try_lock() else {
        return Err((StatusCode::CONFLICT, "a rebuild is already running").into_response());
    };

    tracing::info!(start_url = pipeline.start_url(), "reindex requested");
    match pipeline.rebuild(&state.index).await {
        Ok(report) => {
            tracing::info!(num_docs = report.num_docs, "reindex complete");
            Ok(Json(report))
        }
        Err(e) => {
            tracing::error!(error = %e, "reindex failed; keeping previous index");
            Err((StatusCode::INTERNAL_SERVER_ERROR, format!("index build failed: {e}")).into_response())
        }
    }
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), (StatusCode, String)> {
    let required = match &state.admin_token {
        Some(t) => t,
        None => return Err((StatusCode::UNAUTHORIZED, "ADMIN_TOKEN not set".into())),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "invalid admin token".into()))
    }
}

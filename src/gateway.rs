//! HTTP surface: `/api/analyze`, health, and single-page app delivery.

use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing::info;

use crate::error::AnalyzeError;
use crate::page;
use crate::prompt::build_chat_request;
use crate::upstream::VisionModel;
use crate::verdict::parse_reply;

/// Shared, immutable state for every request.
pub struct AppState {
    pub model: Arc<dyn VisionModel>,
    pub model_id: String,
}

impl AppState {
    pub fn new(model: Arc<dyn VisionModel>, model_id: impl Into<String>) -> Self {
        Self {
            model,
            model_id: model_id.into(),
        }
    }
}

/// Body of `POST /api/analyze`.
#[derive(Debug, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub images: Vec<String>,
}

/// Build the application router.
///
/// Non-API routes are served from `static_dir` when it holds a built
/// bundle, falling back to its `index.html`; otherwise the embedded page
/// answers them.
pub fn router(state: Arc<AppState>, static_dir: &Path, body_limit: usize) -> Router {
    let api = Router::new()
        .route("/api/analyze", post(analyze))
        .route("/api/health", get(health))
        .with_state(state);

    let index = static_dir.join("index.html");
    let app = if index.is_file() {
        info!(dir = %static_dir.display(), "Serving prebuilt bundle");
        api.fallback_service(ServeDir::new(static_dir).fallback(ServeFile::new(index)))
    } else {
        info!(dir = %static_dir.display(), "No prebuilt bundle found, serving embedded page");
        api.fallback_service(get(page::index))
    };

    app.layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// `POST /api/analyze`: one upstream call per batch, reply forwarded as-is.
async fn analyze(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<Value>, AnalyzeError> {
    let Json(request) = payload?;
    info!(images = request.images.len(), "Analyzing parking signs");

    let chat = build_chat_request(&state.model_id, &request.images);
    let reply = state.model.complete(&chat).await?;
    let verdict = parse_reply(&reply)?;

    info!(can_park = ?verdict.get("canPark"), "Analysis complete");
    Ok(Json(verdict))
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "parkcheck",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

//! REST API handlers.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use tracing::debug;

use super::types::{ErrorResponse, GenerateRequest, GenerateResponse, ModelsResponse};
use crate::relay::Relay;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<Relay>,
}

impl AppState {
    pub fn new(relay: Arc<Relay>) -> Self {
        Self { relay }
    }
}

/// Health check endpoint.
pub async fn health() -> &'static str {
    "OK"
}

/// API information endpoint.
pub async fn api_info() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": "ollama-relay",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running"
    }))
}

/// List configured models.
pub async fn list_models(State(state): State<AppState>) -> Json<ModelsResponse> {
    Json(ModelsResponse::from_catalog(state.relay.catalog()))
}

/// Run a prompt to completion and return the terminal emission.
///
/// Process failures are reported in the body with status `error`, not as
/// an HTTP error.
pub async fn generate(
    State(state): State<AppState>,
    Json(req): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, (StatusCode, Json<ErrorResponse>)> {
    if req.prompt.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, Json(ErrorResponse::empty_prompt())));
    }

    let model = state.relay.catalog().resolve(req.model.as_deref());
    debug!(%model, "generate request");

    let last = state.relay.submit(req.prompt, model).finish().await;

    match last {
        Some(emission) => Ok(Json(GenerateResponse::from_emission(emission))),
        None => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::internal_error("run ended without a result")),
        )),
    }
}

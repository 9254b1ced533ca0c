//! Health check handler and response types.

use crate::state::AppState;
use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct HealthCheckResponse {
    pub status: String,
    /// Whether the OpenAI provider is configured
    pub openai: bool,
    /// Whether the Gemini provider is configured
    pub gemini: bool,
}

/// Liveness check
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is alive", body = HealthCheckResponse)
    )
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: "healthy".to_string(),
        openai: state.openai.is_some(),
        gemini: state.gemini.is_some(),
    })
}

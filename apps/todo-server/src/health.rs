use crate::AppState;
use axum::{extract::State, http::StatusCode, response::Json};
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

/// Health response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
}

impl HealthResponse {
    fn new(healthy: bool) -> Self {
        Self {
            status: if healthy { "healthy" } else { "unhealthy" }.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            database: if healthy { "connected" } else { "unreachable" }.to_string(),
        }
    }
}

/// Report whether the store answers; 503 when it does not
#[instrument(skip(state))]
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let healthy = state.store.is_healthy().await;

    if healthy {
        (StatusCode::OK, Json(HealthResponse::new(true)))
    } else {
        warn!("Health check failed: store unreachable");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse::new(false)),
        )
    }
}

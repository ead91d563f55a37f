//! Health check handler.

use axum::Json;
use serde::Serialize;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `"ok"` when the service is up.
    pub status: &'static str,
}

/// Liveness probe.
#[allow(clippy::unused_async)] // Axum handlers are async for consistency
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

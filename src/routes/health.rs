use axum::extract::State;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::services::history::HistoryStore;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status ("ok" when healthy, "degraded" when the history file is unreadable)
    pub status: String,
    /// API version
    pub version: String,
    /// Whether the history file is readable (an absent file counts as healthy)
    pub history_store: bool,
}

/// Health check endpoint.
///
/// Returns the API status and version, and verifies the history file is
/// readable. Returns "degraded" (still 200) when it is not, so load
/// balancers can distinguish partial failures.
#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_check(State(history): State<Arc<HistoryStore>>) -> Json<HealthResponse> {
    let store_ok = history.is_healthy().await;

    Json(HealthResponse {
        status: if store_ok {
            "ok".to_string()
        } else {
            "degraded".to_string()
        },
        version: env!("CARGO_PKG_VERSION").to_string(),
        history_store: store_ok,
    })
}

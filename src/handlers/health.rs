use crate::AppState;
use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;

/// GET /healthz
///
/// 200 while the store answers a ping, 503 otherwise. No auth.
pub async fn healthz(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    let version = env!("CARGO_PKG_VERSION");

    match state.service.health().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "ok": true,
                "version": version,
                "database": "connected",
                "timestamp": Utc::now(),
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {:?}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "ok": false,
                    "version": version,
                    "database": "disconnected",
                    "error": "Database connection failed",
                    "timestamp": Utc::now(),
                })),
            )
        }
    }
}

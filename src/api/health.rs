use axum::{Json, extract::State, http::StatusCode};
use std::sync::Arc;

use super::{AppState, BannerDto, HealthDto};

/// GET /
pub async fn root(State(state): State<Arc<AppState>>) -> Json<BannerDto> {
    Json(BannerDto {
        message: format!("{} API Server", state.shared.config.general.site_name),
        status: "running",
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// GET /health
pub async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthDto>) {
    let uptime = state.start_time.elapsed().as_secs_f64();
    let timestamp = chrono::Utc::now().to_rfc3339();

    match state.shared.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthDto {
                status: "healthy",
                database: "connected",
                timestamp,
                uptime,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed to reach the database");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthDto {
                    status: "error",
                    database: "disconnected",
                    timestamp,
                    uptime,
                }),
            )
        }
    }
}

use crate::transport::http::types::{AppState, HealthResponse};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy (records file readable)", body = HealthResponse),
        (status = 503, description = "Service is unhealthy (records file unreadable)", body = HealthResponse)
    )
)]
pub async fn healthcheck_handler(State(state): State<AppState>) -> impl IntoResponse {
    let service = state.certificates.lock().await;

    match service.count().await {
        Ok(n) => (
            StatusCode::OK,
            Json(HealthResponse {
                success: true,
                status: "ok".to_string(),
                certificates: Some(n),
                error: None,
            }),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                success: false,
                status: "unhealthy".to_string(),
                certificates: None,
                error: Some(format!("Records file check failed: {}", e)),
            }),
        ),
    }
}

use axum::{extract::Extension, http::StatusCode, Json};
use serde::Serialize;

use crate::app::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    db: String,
    timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

/// Health check endpoint
///
/// Returns 200 OK if the cache store answers, 503 Service Unavailable
/// otherwise.
pub async fn health_handler(
    Extension(state): Extension<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let ping = tokio::time::timeout(
        std::time::Duration::from_secs(5),
        state.workflow.store().ping(),
    )
    .await;

    let error = match ping {
        Ok(Ok(())) => None,
        Ok(Err(e)) => Some(format!("Query failed: {}", e)),
        Err(_) => Some("Query timeout (>5s)".to_string()),
    };
    let timestamp = chrono::Utc::now().to_rfc3339();

    match error {
        None => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok".to_string(),
                db: "connected".to_string(),
                timestamp,
                message: None,
            }),
        ),
        Some(message) => {
            tracing::warn!(error = %message, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "error".to_string(),
                    db: "disconnected".to_string(),
                    timestamp,
                    message: Some(message),
                }),
            )
        }
    }
}

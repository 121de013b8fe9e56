// Health and metrics endpoints

use axum::{extract::State, http::StatusCode, Json};
use std::time::Duration;
use tracing::warn;

use crate::api::responses::{ApiError, HealthResponse};
use crate::api::AppState;

const STORE_PING_TIMEOUT: Duration = Duration::from_millis(800);

/// GET /health
///
/// Reports 503 when the document store does not answer a ping in time.
pub async fn health_handler(
    State(app_state): State<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let database = match tokio::time::timeout(STORE_PING_TIMEOUT, app_state.users.ping()).await {
        Ok(Ok(())) => "connected".to_string(),
        Ok(Err(e)) => {
            warn!(error = %e, "Store ping failed");
            "disconnected".to_string()
        }
        Err(_) => {
            warn!("Store ping timed out in health check");
            "timeout".to_string()
        }
    };

    let (status, label) = if database == "connected" {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        status,
        Json(HealthResponse {
            status: label.to_string(),
            database,
        }),
    )
}

/// GET /metrics
///
/// Prometheus text exposition format.
pub async fn metrics_handler(State(app_state): State<AppState>) -> Result<String, ApiError> {
    Ok(app_state.metrics.render()?)
}

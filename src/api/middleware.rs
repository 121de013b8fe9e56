// Middleware stack for observability and protection

use axum::{http::StatusCode, BoxError, Json};
use tower_http::{
    classify::{ServerErrorsAsFailures, SharedClassifier},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::api::responses::ErrorResponse;

/// HTTP tracing: method, path, status and latency for every request
pub fn tracing_layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    TraceLayer::new_for_http()
}

/// Rejects bodies over `limit` bytes with 413
pub fn body_size_limit_layer(limit: usize) -> RequestBodyLimitLayer {
    RequestBodyLimitLayer::new(limit)
}

/// Turn errors raised by tower layers (timeout) into JSON responses
pub async fn handle_middleware_error(err: BoxError) -> (StatusCode, Json<ErrorResponse>) {
    let (status, msg) = if err.is::<tower::timeout::error::Elapsed>() {
        (StatusCode::REQUEST_TIMEOUT, "Request timed out")
    } else {
        (StatusCode::INTERNAL_SERVER_ERROR, "Server Error")
    };

    (
        status,
        Json(ErrorResponse {
            msg: msg.to_string(),
            request_id: None,
        }),
    )
}

// JSON body extractor whose rejections render like every other API error

use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;
use axum::http::StatusCode;
use tracing::debug;

use crate::api::responses::ApiError;

/// `axum::Json` with rejections mapped to `ApiError`
///
/// A missing content type, malformed JSON or a body of the wrong shape is a
/// 400 with a `{"msg": ...}` body instead of axum's plain-text rejection.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        debug!(error = %rejection, "Rejected request body");

        match rejection {
            JsonRejection::MissingJsonContentType(_) => ApiError::new(
                StatusCode::BAD_REQUEST,
                "Request body must be JSON".to_string(),
            ),
            JsonRejection::JsonSyntaxError(_) => {
                ApiError::new(StatusCode::BAD_REQUEST, "Malformed JSON body".to_string())
            }
            JsonRejection::JsonDataError(inner) => ApiError::new(
                StatusCode::BAD_REQUEST,
                format!("Invalid request body: {}", inner.body_text()),
            ),
            other => ApiError::new(other.status(), "Unable to read request body".to_string()),
        }
    }
}

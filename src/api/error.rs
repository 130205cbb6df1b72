use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Failures answered with a non-200 status. Everything past authorization
/// and body decoding is reported inside the character response instead.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid token")]
    Unauthorized,
    #[error("invalid request body: {0}")]
    InvalidBody(#[from] JsonRejection),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "detail": "Invalid token" })),
            )
                .into_response(),
            ApiError::InvalidBody(rejection) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({
                    "detail": [{
                        "loc": ["body"],
                        "msg": rejection.body_text(),
                        "type": "value_error",
                    }]
                })),
            )
                .into_response(),
        }
    }
}

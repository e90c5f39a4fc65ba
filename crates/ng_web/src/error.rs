use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ng_core::Error;
use serde::Serialize;
use tracing::error;

#[derive(Debug)]
pub enum ApiError {
    Core(Error),
    NotFound(String),
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        ApiError::Core(e)
    }
}

// Bodies axum cannot read follow the same contract as every other bad input.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Core(Error::InvalidInput(rejection.body_text()))
    }
}

#[derive(Serialize)]
struct ErrorBody {
    status: &'static str,
    code: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Upstream details stay in the logs; they can carry keys or tokens.
        let (status, code, message) = match &self {
            ApiError::NotFound(name) => (
                StatusCode::NOT_FOUND,
                "not_found",
                format!("Unknown profile: {}", name),
            ),
            ApiError::Core(e @ Error::UpstreamUnavailable { .. }) => {
                error!(error = %e, "request failed");
                (
                    StatusCode::BAD_GATEWAY,
                    e.code(),
                    "The news source is currently unavailable".to_string(),
                )
            }
            ApiError::Core(e @ Error::InvalidInput(_)) => {
                (StatusCode::BAD_REQUEST, e.code(), e.to_string())
            }
            ApiError::Core(e) => {
                error!(error = %e, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error".to_string(),
                )
            }
        };

        let body = ErrorBody {
            status: "error",
            code,
            message,
        };
        (status, Json(body)).into_response()
    }
}

use std::future::Future;
use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use course_common::api::ErrorBody;
use course_common::error::CommonError;
use tracing::error;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Common(#[from] CommonError),

    #[error("config error: {0}")]
    Config(String),

    #[error("completedCourses must be a non-empty array")]
    InvalidInput,

    #[error("No matching completed courses found")]
    NoMatchingCourses,

    #[error("Invalid courses format")]
    InvalidCourses,

    #[error("upstream unavailable during {operation}: {reason}")]
    UpstreamUnavailable {
        operation: &'static str,
        reason: String,
    },
}

impl AppError {
    /// Map to an HTTP error. Client errors carry their own message; anything
    /// else is logged and reported as `failure` with a 500.
    pub fn into_api(self, failure: &'static str) -> ApiError {
        match self {
            AppError::InvalidInput | AppError::NoMatchingCourses | AppError::InvalidCourses => {
                ApiError::new(StatusCode::BAD_REQUEST, self.to_string())
            }
            other => {
                error!(error = %other, "{failure}");
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, failure)
            }
        }
    }
}

/// Run a store call under `timeout`, turning failures and timeouts into
/// [`AppError::UpstreamUnavailable`].
pub async fn bounded<T, F>(operation: &'static str, timeout: Duration, call: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, CommonError>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(AppError::UpstreamUnavailable {
            operation,
            reason: e.to_string(),
        }),
        Err(_) => Err(AppError::UpstreamUnavailable {
            operation,
            reason: format!("timed out after {}ms", timeout.as_millis()),
        }),
    }
}

/// HTTP error response rendered as `{"error": message}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

use crate::shared::error::VulnTrackError;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Seconds a client is asked to wait after a 429
pub const RETRY_AFTER_SECS: u64 = 30;

/// Error response with a `{"detail": "..."}` body
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    fn unprocessable(detail: String) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, detail)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        let Some(typed) = err.downcast_ref::<VulnTrackError>() else {
            tracing::error!(error = %format!("{:#}", err), "Unhandled error");
            return Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error");
        };

        let status = match typed {
            VulnTrackError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            VulnTrackError::InvalidRequest { .. } | VulnTrackError::Conflict { .. } => {
                StatusCode::BAD_REQUEST
            }
            VulnTrackError::NotFound { .. } => StatusCode::NOT_FOUND,
            VulnTrackError::TooManyPendingScans { .. } => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %typed, "Request failed");
        }
        Self::new(status, typed.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::unprocessable(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::unprocessable(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::unprocessable(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = (self.status, Json(json!({ "detail": self.detail }))).into_response();
        if self.status == StatusCode::TOO_MANY_REQUESTS {
            response
                .headers_mut()
                .insert("retry-after", HeaderValue::from(RETRY_AFTER_SECS));
        }
        response
    }
}

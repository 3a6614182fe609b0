use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::error::ServiceError;

/// Uniform response envelope. Every endpoint, success or failure, answers with
/// `{ "code": ..., "message": ..., "data": ... }` and `code` mirrors the HTTP
/// status of the response.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub code: u16,
    pub message: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Json<Self> {
        Json(Self {
            code: 200,
            message: "success".into(),
            data: Some(data),
        })
    }

    pub fn success_with(message: impl Into<String>, data: T) -> Json<Self> {
        Json(Self {
            code: 200,
            message: message.into(),
            data: Some(data),
        })
    }
}

/// Wrapper that turns a [`ServiceError`] into an enveloped HTTP response.
/// Handlers return `Result<_, ApiError>` and rely on `?` for the conversion.
#[derive(Debug)]
pub struct ApiError(pub ServiceError);

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        Self(err)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self(ServiceError::Internal(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ServiceError::Internal(err) => {
                // Full cause goes to the log only; clients get the generic message.
                error!(error = ?err, "request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = ApiResponse::<()> {
            code: status.as_u16(),
            message: self.0.to_string(),
            data: None,
        };
        (status, Json(body)).into_response()
    }
}

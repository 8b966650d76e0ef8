//! Mapping of failures onto HTTP responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

use super::responses::ErrorResponse;
use crate::{services::ProviderError, time::TimeError};

/// Anything a handler can fail with
#[derive(Debug)]
pub enum ApiError {
    Provider(ProviderError),
    NoSchedule,
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Provider(ProviderError::InvalidTime(_)) => StatusCode::BAD_REQUEST,
            ApiError::Provider(ProviderError::LocationNotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Provider(ProviderError::LocationAccessDenied(_)) => StatusCode::FORBIDDEN,
            ApiError::Provider(ProviderError::ProviderUnavailable(_)) => StatusCode::BAD_GATEWAY,
            ApiError::NoSchedule => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Provider(e) => e.to_string(),
            ApiError::NoSchedule => "No prayer times loaded yet".to_string(),
            ApiError::Internal(e) => e.clone(),
        }
    }
}

impl From<ProviderError> for ApiError {
    fn from(e: ProviderError) -> Self {
        ApiError::Provider(e)
    }
}

impl From<TimeError> for ApiError {
    fn from(e: TimeError) -> Self {
        ApiError::Provider(ProviderError::InvalidTime(e))
    }
}

impl From<String> for ApiError {
    fn from(e: String) -> Self {
        ApiError::Internal(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self.message());
        }
        (status, Json(ErrorResponse { error: self.message() })).into_response()
    }
}

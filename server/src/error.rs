//! HTTP-boundary error type.
//!
//! Every handler and the access gate return `AppError`; `IntoResponse` maps
//! each variant onto a status code and an `ApiException` JSON body.
//! Store failures are logged in full and answered with a generic message so
//! driver details never reach the client.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::QueryRejection;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::{model::ValidationError, service::ServiceError, store::StoreError};

/// Error body returned by every failing request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiException {
    pub status_code: u16,
    pub error: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or malformed request input.
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The record's current state forbids the requested change.
    #[error("{0}")]
    Invariant(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) | AppError::Validation(_) | AppError::Invariant(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(e) => AppError::Validation(e),
            ServiceError::NotFound(_) => AppError::NotFound(err.to_string()),
            ServiceError::Frozen(_) => AppError::Invariant(err.to_string()),
            ServiceError::Store(e) => AppError::Store(e),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Store(err) => {
                tracing::error!(error = %err, "store operation failed");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = ApiException {
            status_code: status.as_u16(),
            error: status.canonical_reason().unwrap_or_default().to_string(),
            message,
            timestamp: Utc::now(),
        };
        (status, Json(body)).into_response()
    }
}

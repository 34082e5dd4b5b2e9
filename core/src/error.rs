//! Error types for the todo API client.
//!
//! # Design
//! The statuses the server uses deliberately (400, 401, 403, 404) get their
//! own variants carrying the server's message. Anything else lands in
//! `HttpError` with the raw status and body.

use thiserror::Error;

/// Errors returned by `TodoClient` build and parse methods.
#[derive(Debug, Error)]
pub enum ApiError {
    /// 400: missing field, invalid value, or the todo is already completed.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// 401: no usable bearer token.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// 403: the token's role may not call this operation.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// 404: the requested todo does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),
}

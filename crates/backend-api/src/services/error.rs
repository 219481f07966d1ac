use thiserror::Error;

use crate::error::ApiError;

/// Errors produced by the service layer. Route handlers convert these into
/// HTTP responses via the `From` impl below.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(message) => ApiError::not_found(message),
            ServiceError::Forbidden(message) => ApiError::forbidden(message),
            ServiceError::Conflict(message) => ApiError::conflict(message),
            ServiceError::BadRequest(message) => ApiError::bad_request(message),
            ServiceError::Database(err) => {
                tracing::error!(error = %err, "database error in service layer");
                ApiError::internal_server_error("internal server error")
            }
            ServiceError::Internal(message) => {
                tracing::error!(message, "internal error in service layer");
                ApiError::internal_server_error("internal server error")
            }
        }
    }
}

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use std::fmt;

use super::ApiResponse;
use crate::services::{AccountError, RotationError, TargetError};

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),

    DatabaseError(String),

    /// The target could not be reached or refused the change. The message is
    /// already free of target-supplied text.
    BadGateway(String),

    ValidationError(String),

    Conflict(String),

    RateLimited { message: String, retry_after_secs: i64 },

    /// A rotation reached the target but was not stored.
    ManualRecovery(String),

    InternalError(String),

    Unauthorized(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            ApiError::BadGateway(msg) => write!(f, "Bad gateway: {}", msg),
            ApiError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::RateLimited { message, .. } => write!(f, "Rate limited: {}", message),
            ApiError::ManualRecovery(msg) => write!(f, "Manual recovery required: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut retry_after = None;
        let (status, error_message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A database error occurred".to_string(),
                )
            }
            ApiError::BadGateway(msg) => {
                tracing::warn!("Target error: {}", msg);
                (StatusCode::BAD_GATEWAY, msg.clone())
            }
            ApiError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            ApiError::RateLimited {
                message,
                retry_after_secs,
            } => {
                retry_after = Some(*retry_after_secs);
                (StatusCode::TOO_MANY_REQUESTS, message.clone())
            }
            ApiError::ManualRecovery(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
        };

        let body = ApiResponse::<()>::error(error_message);
        let mut response = (status, Json(body)).into_response();
        if let Some(secs) = retry_after
            && let Ok(value) = HeaderValue::from_str(&secs.to_string())
        {
            response.headers_mut().insert(header::RETRY_AFTER, value);
        }
        response
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::InternalError(err.to_string())
    }
}

impl From<RotationError> for ApiError {
    fn from(err: RotationError) -> Self {
        let message = err.to_string();
        match err {
            RotationError::NotFound(_) => ApiError::NotFound(message),
            RotationError::Validation(_) => ApiError::ValidationError(message),
            RotationError::RateLimited {
                retry_after_secs, ..
            } => ApiError::RateLimited {
                message,
                retry_after_secs,
            },
            RotationError::Transport { .. } | RotationError::Protocol { .. } => {
                ApiError::BadGateway(message)
            }
            RotationError::ManualRecoveryRequired { .. } => ApiError::ManualRecovery(message),
            RotationError::Storage(_) => ApiError::DatabaseError(message),
        }
    }
}

impl From<TargetError> for ApiError {
    fn from(err: TargetError) -> Self {
        let message = err.to_string();
        match err {
            TargetError::NotFound(_) => ApiError::NotFound(message),
            TargetError::Validation(_) => ApiError::ValidationError(message),
            TargetError::Conflict { .. } => ApiError::Conflict(message),
            TargetError::Storage(_) => ApiError::DatabaseError(message),
        }
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        let message = err.to_string();
        match err {
            AccountError::NotFound(_) => ApiError::NotFound(message),
            AccountError::Validation(_) => ApiError::ValidationError(message),
            AccountError::NotYetRotated(_) => ApiError::Conflict(message),
            AccountError::Storage(_) => ApiError::DatabaseError(message),
        }
    }
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ApiError::ValidationError(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        ApiError::InternalError(msg.into())
    }
}

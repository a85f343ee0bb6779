use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::utils::{error_codes, error_to_api_response};

pub type AppResult<T> = std::result::Result<T, AppError>;

/// Error kinds the boundary layer maps onto HTTP statuses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UpstreamUnavailable,
    NotFound,
    Validation,
    Conflict,
    Unauthorized,
    Internal,
}

#[derive(Debug, Error)]
pub enum AppError {
    /// Network failure, timeout, non-2xx or simulated failure from an external system
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("validation failed: {0}")]
    Validation(String),

    /// The write collides with existing state: a taken slot, a full event, a duplicate
    #[error("conflict: {0}")]
    Conflict(String),

    /// Token missing, invalid, expired or revoked
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn upstream(message: impl Into<String>) -> Self {
        AppError::UpstreamUnavailable(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::UpstreamUnavailable(_) => ErrorKind::UpstreamUnavailable,
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::Validation(_) => ErrorKind::Validation,
            AppError::Conflict(_) => ErrorKind::Conflict,
            AppError::Unauthorized(_) => ErrorKind::Unauthorized,
            AppError::Internal(_) => ErrorKind::Internal,
        }
    }

    fn error_code(&self) -> i32 {
        match self.kind() {
            ErrorKind::UpstreamUnavailable => error_codes::UPSTREAM_ERROR,
            ErrorKind::NotFound => error_codes::NOT_FOUND,
            ErrorKind::Validation => error_codes::VALIDATION_ERROR,
            ErrorKind::Conflict => error_codes::CONFLICT,
            ErrorKind::Unauthorized => error_codes::AUTH_FAILED,
            ErrorKind::Internal => error_codes::INTERNAL_ERROR,
        }
    }

    fn status(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::UpstreamUnavailable => StatusCode::BAD_GATEWAY,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("record not found".to_string()),
            other => AppError::Internal(format!("database error: {}", other)),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        AppError::Unauthorized(format!("invalid or expired token: {}", err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                "internal error".to_string()
            }
            other => other.to_string(),
        };
        let body = error_to_api_response::<()>(self.error_code(), message);

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_maps_to_status() {
        assert_eq!(
            AppError::upstream("lms down").status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::NotFound("session".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Validation("bot type".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Conflict("room taken".into()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Unauthorized("revoked".into()).status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_row_not_found_becomes_not_found() {
        let err: AppError = sqlx::Error::RowNotFound.into();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_internal_detail_stays_out_of_the_response() {
        let err: AppError = sqlx::Error::PoolTimedOut.into();
        assert_eq!(err.kind(), ErrorKind::Internal);

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["code"], error_codes::INTERNAL_ERROR);
        assert_eq!(body["error_message"], "internal error");
        assert!(!String::from_utf8_lossy(&bytes).contains("database error"));
    }

    #[test]
    fn test_message_carries_detail() {
        let err = AppError::Validation("Invalid bot type".into());
        assert!(err.to_string().contains("Invalid bot type"));
    }
}

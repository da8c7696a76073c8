//! HTTP handlers for the credential lifecycle.
//!
//! Handlers are thin: they extract the request, call one
//! [`AuthService`](crate::AuthService) method, and shape the response.
//! Failures become [`AppError`] through the `From<AuthError>` impl below.

pub mod auth;
pub mod extract;
pub mod mypage;

pub use extract::AuthenticatedMember;

use crate::error::{AuthError, ErrorKind};
use axum::http::StatusCode;
use pharmacy_web::AppError;
use serde::Serialize;

/// Plain acknowledgment body.
#[derive(Debug, Clone, Serialize)]
pub struct Ack {
    /// Human-readable confirmation.
    pub message: String,
}

impl Ack {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        let status = match err.kind() {
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Internal details stay in the log
        let message = if err.is_user_error() {
            err.to_string()
        } else {
            tracing::error!(error = %err, code = err.code(), "Auth request failed");
            match err.kind() {
                ErrorKind::Unavailable => "Service temporarily unavailable".to_string(),
                _ => "An internal error occurred".to_string(),
            }
        };

        Self::new(status, message, err.code().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_errors_keep_message() {
        let app: AppError = AuthError::InvalidResetToken.into();
        assert_eq!(app.status(), StatusCode::BAD_REQUEST);
        assert_eq!(app.code(), "INVALID_OR_EXPIRED_TOKEN");
        assert_eq!(app.message(), "Invalid or expired token");
    }

    #[test]
    fn test_internal_errors_are_masked() {
        let app: AppError = AuthError::DatabaseError("relation members does not exist".into()).into();
        assert_eq!(app.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!app.message().contains("relation"));

        let app: AppError = AuthError::EmailError("smtp timeout".into()).into();
        assert_eq!(app.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(app.code(), "SERVICE_UNAVAILABLE");
    }

    #[test]
    fn test_conflict() {
        let app: AppError = AuthError::EmailAlreadyRegistered.into();
        assert_eq!(app.status(), StatusCode::CONFLICT);
        assert_eq!(app.code(), "EMAIL_TAKEN");
    }
}

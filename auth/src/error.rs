//! Error types for identity and credential operations.

use thiserror::Error;

/// Result type alias for authentication operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Coarse classification of an [`AuthError`].
///
/// The HTTP layer maps each kind to a status family. User-shaped kinds are
/// 4xx and never retried; `Internal` and `Unavailable` are 5xx.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad or missing credentials (401).
    Unauthorized,
    /// Invalid one-time token or unmet precondition (400).
    BadRequest,
    /// Uniqueness violation (409).
    Conflict,
    /// Bug or data-integrity fault (500).
    Internal,
    /// A transient dependency (token store, mail relay) failed (503).
    Unavailable,
}

/// Error taxonomy for the credential lifecycle.
///
/// One-time token variants deliberately do not say *why* a token was
/// rejected (expired vs. never issued vs. already consumed).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AuthError {
    // ═══════════════════════════════════════════════════════════
    // Authentication Errors
    // ═══════════════════════════════════════════════════════════

    /// No active account for the supplied identity.
    #[error("No such account")]
    AccountNotFound,

    /// Password did not match.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Refresh token unknown, expired, or revoked.
    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    /// Access token malformed or signature mismatch.
    #[error("Invalid access token")]
    InvalidAccessToken,

    /// Access token past its validity window.
    #[error("Access token has expired")]
    AccessTokenExpired,

    // ═══════════════════════════════════════════════════════════
    // One-time Token / Precondition Errors
    // ═══════════════════════════════════════════════════════════

    /// Email verification link is invalid or expired.
    #[error("Invalid link")]
    InvalidVerificationLink,

    /// Registration attempted without a live verification record.
    #[error("Email verification required")]
    EmailNotVerified,

    /// Password reset token is invalid or expired.
    #[error("Invalid or expired token")]
    InvalidResetToken,

    /// Email address failed syntax validation.
    #[error("Invalid email address")]
    InvalidEmail,

    // ═══════════════════════════════════════════════════════════
    // Conflicts
    // ═══════════════════════════════════════════════════════════

    /// Email address already belongs to an account.
    #[error("Email is already registered")]
    EmailAlreadyRegistered,

    // ═══════════════════════════════════════════════════════════
    // System Errors
    // ═══════════════════════════════════════════════════════════

    /// An active member has no pharmacy attached.
    #[error("Member {member_id} has no pharmacy")]
    MissingPharmacy {
        /// Member whose pharmacy link is missing
        member_id: i64,
    },

    /// Database operation failed.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Ephemeral token store operation failed.
    #[error("Token store error: {0}")]
    TokenStoreError(String),

    /// Email delivery failed.
    #[error("Email error: {0}")]
    EmailError(String),

    /// Payload (de)serialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Password hashing failed.
    #[error("Hashing error: {0}")]
    HashingError(String),

    /// Access token could not be signed.
    #[error("Token signing error: {0}")]
    TokenSigningError(String),
}

impl AuthError {
    /// Classify this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::AccountNotFound
            | Self::InvalidCredentials
            | Self::InvalidRefreshToken
            | Self::InvalidAccessToken
            | Self::AccessTokenExpired => ErrorKind::Unauthorized,
            Self::InvalidVerificationLink
            | Self::EmailNotVerified
            | Self::InvalidResetToken
            | Self::InvalidEmail => ErrorKind::BadRequest,
            Self::EmailAlreadyRegistered => ErrorKind::Conflict,
            Self::TokenStoreError(_) | Self::EmailError(_) => ErrorKind::Unavailable,
            Self::MissingPharmacy { .. }
            | Self::DatabaseError(_)
            | Self::SerializationError(_)
            | Self::HashingError(_)
            | Self::TokenSigningError(_) => ErrorKind::Internal,
        }
    }

    /// Returns `true` if this error is due to invalid user input.
    ///
    /// # Examples
    ///
    /// ```
    /// # use pharmacy_auth::AuthError;
    /// assert!(AuthError::InvalidCredentials.is_user_error());
    /// assert!(!AuthError::HashingError("boom".into()).is_user_error());
    /// ```
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Unauthorized | ErrorKind::BadRequest | ErrorKind::Conflict
        )
    }

    /// Returns `true` if the failure came from a transient dependency.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self.kind(), ErrorKind::Unavailable)
    }

    /// Stable machine-readable code for clients.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::AccountNotFound => "ACCOUNT_NOT_FOUND",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::InvalidRefreshToken => "INVALID_REFRESH_TOKEN",
            Self::InvalidAccessToken => "INVALID_ACCESS_TOKEN",
            Self::AccessTokenExpired => "ACCESS_TOKEN_EXPIRED",
            Self::InvalidVerificationLink => "INVALID_LINK",
            Self::EmailNotVerified => "EMAIL_NOT_VERIFIED",
            Self::InvalidResetToken => "INVALID_OR_EXPIRED_TOKEN",
            Self::InvalidEmail => "INVALID_EMAIL",
            Self::EmailAlreadyRegistered => "EMAIL_TAKEN",
            Self::TokenStoreError(_) | Self::EmailError(_) => "SERVICE_UNAVAILABLE",
            Self::MissingPharmacy { .. }
            | Self::DatabaseError(_)
            | Self::SerializationError(_)
            | Self::HashingError(_)
            | Self::TokenSigningError(_) => "INTERNAL_SERVER_ERROR",
        }
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_family() {
        for err in [
            AuthError::AccountNotFound,
            AuthError::InvalidCredentials,
            AuthError::InvalidRefreshToken,
            AuthError::AccessTokenExpired,
        ] {
            assert_eq!(err.kind(), ErrorKind::Unauthorized, "{err}");
            assert!(err.is_user_error());
        }
    }

    #[test]
    fn test_one_time_tokens_do_not_reveal_reason() {
        assert_eq!(AuthError::InvalidResetToken.to_string(), "Invalid or expired token");
        assert_eq!(AuthError::InvalidVerificationLink.to_string(), "Invalid link");
    }

    #[test]
    fn test_missing_pharmacy_is_internal() {
        let err = AuthError::MissingPharmacy { member_id: 7 };
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert!(!err.is_user_error());
        assert_eq!(err.code(), "INTERNAL_SERVER_ERROR");
    }

    #[test]
    fn test_transient_errors() {
        assert!(AuthError::TokenStoreError("down".into()).is_transient());
        assert!(AuthError::EmailError("relay".into()).is_transient());
        assert!(!AuthError::DatabaseError("x".into()).is_transient());
    }

    #[test]
    fn test_conflict() {
        assert_eq!(AuthError::EmailAlreadyRegistered.kind(), ErrorKind::Conflict);
        assert_eq!(AuthError::EmailAlreadyRegistered.code(), "EMAIL_TAKEN");
    }
}

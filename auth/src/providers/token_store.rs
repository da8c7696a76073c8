//! Ephemeral token store trait.
//!
//! Refresh tokens, email verification tokens, and password reset tokens all
//! live in one TTL-capable key-value store, separated by key prefix.

use crate::error::Result;
use crate::state::MemberId;
use chrono::Duration;
use std::fmt;

/// Key namespaces of the ephemeral store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TokenKey {
    /// `refresh_token:<token>` holding `{"memberId": ..}`.
    Refresh(String),

    /// `email_verif:<token>` holding `{"email": ..}`.
    EmailVerification(String),

    /// `email_verified:<email>`, present while the email may register.
    VerifiedEmail(String),

    /// `password_verif:<token>` holding `{"memberId": ..}`.
    PasswordReset(String),

    /// `member_refresh_tokens:<memberId>`, the set of a member's live refresh tokens.
    MemberRefreshIndex(MemberId),
}

impl TokenKey {
    /// Key prefix of this namespace.
    #[must_use]
    pub const fn prefix(&self) -> &'static str {
        match self {
            Self::Refresh(_) => "refresh_token",
            Self::EmailVerification(_) => "email_verif",
            Self::VerifiedEmail(_) => "email_verified",
            Self::PasswordReset(_) => "password_verif",
            Self::MemberRefreshIndex(_) => "member_refresh_tokens",
        }
    }
}

impl fmt::Display for TokenKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Refresh(v)
            | Self::EmailVerification(v)
            | Self::VerifiedEmail(v)
            | Self::PasswordReset(v) => write!(f, "{}:{v}", self.prefix()),
            Self::MemberRefreshIndex(id) => write!(f, "{}:{id}", self.prefix()),
        }
    }
}

/// TTL-capable key-value store.
///
/// # Implementation Notes
///
/// - Expiry is enforced by the store: once `ttl` has elapsed, `get` and
///   `take` MUST return `None` without any caller-side timestamp check
/// - **CRITICAL**: `take()` and `index_drain()` MUST be atomic (`Redis`
///   GETDEL / MULTI) so one-time tokens cannot be consumed twice
/// - `delete()` of an absent key is not an error
pub trait TokenStore: Send + Sync {
    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns error if the store is unreachable.
    fn put(
        &self,
        key: &TokenKey,
        value: &str,
        ttl: Duration,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Read a live value.
    ///
    /// # Errors
    ///
    /// Returns error if the store is unreachable.
    fn get(&self, key: &TokenKey)
    -> impl std::future::Future<Output = Result<Option<String>>> + Send;

    /// Atomically read and delete a live value.
    ///
    /// # Errors
    ///
    /// Returns error if the store is unreachable.
    fn take(
        &self,
        key: &TokenKey,
    ) -> impl std::future::Future<Output = Result<Option<String>>> + Send;

    /// Delete a key. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns error if the store is unreachable.
    fn delete(&self, key: &TokenKey) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Add `member` to the set at `index`, extending the set's TTL to `ttl`.
    ///
    /// # Errors
    ///
    /// Returns error if the store is unreachable.
    fn index_add(
        &self,
        index: &TokenKey,
        member: &str,
        ttl: Duration,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Remove `member` from the set at `index`.
    ///
    /// # Errors
    ///
    /// Returns error if the store is unreachable.
    fn index_remove(
        &self,
        index: &TokenKey,
        member: &str,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Atomically read and clear the set at `index`.
    ///
    /// # Errors
    ///
    /// Returns error if the store is unreachable.
    fn index_drain(
        &self,
        index: &TokenKey,
    ) -> impl std::future::Future<Output = Result<Vec<String>>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_namespaces() {
        assert_eq!(
            TokenKey::Refresh("abc".into()).to_string(),
            "refresh_token:abc"
        );
        assert_eq!(
            TokenKey::EmailVerification("abc".into()).to_string(),
            "email_verif:abc"
        );
        assert_eq!(
            TokenKey::VerifiedEmail("a@x.com".into()).to_string(),
            "email_verified:a@x.com"
        );
        assert_eq!(
            TokenKey::PasswordReset("abc".into()).to_string(),
            "password_verif:abc"
        );
        assert_eq!(
            TokenKey::MemberRefreshIndex(MemberId(42)).to_string(),
            "member_refresh_tokens:42"
        );
    }

    #[test]
    fn test_same_token_different_namespace() {
        let refresh = TokenKey::Refresh("t".into());
        let reset = TokenKey::PasswordReset("t".into());
        assert_ne!(refresh.to_string(), reset.to_string());
    }
}

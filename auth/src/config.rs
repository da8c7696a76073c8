//! Authentication configuration.
//!
//! Values are supplied by the application (see the server's `Config::from_env`);
//! the defaults here match production lifetimes and are fine for local development.

use crate::constants::ttl;
use chrono::Duration;

/// Configuration for the credential lifecycle.
#[derive(Clone)]
pub struct AuthConfig {
    /// Public base URL used to build emailed links (e.g., "https://pharmacy.example.com").
    ///
    /// Verification links are `{base_url}/auth/verify-email?token={token}`.
    pub base_url: String,

    /// HMAC secret for signing access tokens.
    pub jwt_secret: String,

    /// Access token validity.
    ///
    /// Default: 1 hour
    pub access_token_ttl: Duration,

    /// Refresh token validity.
    ///
    /// Default: 7 days
    pub refresh_token_ttl: Duration,

    /// Email verification link validity.
    ///
    /// Default: 30 minutes
    pub email_verification_ttl: Duration,

    /// How long a confirmed email remains usable for registration.
    ///
    /// Default: 24 hours
    pub verified_email_ttl: Duration,

    /// Password reset link validity.
    ///
    /// Default: 30 minutes
    pub password_reset_ttl: Duration,

    /// Answer password-reset requests for unknown accounts with
    /// `AccountNotFound` instead of a silent acknowledgment.
    ///
    /// Default: false
    pub reveal_unknown_reset_accounts: bool,
}

impl AuthConfig {
    /// Create new configuration with default lifetimes.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Public base URL of the application
    /// * `jwt_secret` - Secret for signing access tokens
    #[must_use]
    pub const fn new(base_url: String, jwt_secret: String) -> Self {
        Self {
            base_url,
            jwt_secret,
            access_token_ttl: Duration::seconds(ttl::ACCESS_TOKEN_SECS),
            refresh_token_ttl: Duration::seconds(ttl::REFRESH_TOKEN_SECS),
            email_verification_ttl: Duration::seconds(ttl::EMAIL_VERIFICATION_SECS),
            verified_email_ttl: Duration::seconds(ttl::VERIFIED_EMAIL_SECS),
            password_reset_ttl: Duration::seconds(ttl::PASSWORD_RESET_SECS),
            reveal_unknown_reset_accounts: false,
        }
    }

    /// Set access token validity.
    #[must_use]
    pub const fn with_access_token_ttl(mut self, ttl: Duration) -> Self {
        self.access_token_ttl = ttl;
        self
    }

    /// Set refresh token validity.
    #[must_use]
    pub const fn with_refresh_token_ttl(mut self, ttl: Duration) -> Self {
        self.refresh_token_ttl = ttl;
        self
    }

    /// Set email verification link validity.
    #[must_use]
    pub const fn with_email_verification_ttl(mut self, ttl: Duration) -> Self {
        self.email_verification_ttl = ttl;
        self
    }

    /// Set how long a confirmed email stays registrable.
    #[must_use]
    pub const fn with_verified_email_ttl(mut self, ttl: Duration) -> Self {
        self.verified_email_ttl = ttl;
        self
    }

    /// Set password reset link validity.
    #[must_use]
    pub const fn with_password_reset_ttl(mut self, ttl: Duration) -> Self {
        self.password_reset_ttl = ttl;
        self
    }

    /// Disclose unknown accounts on password-reset requests.
    #[must_use]
    pub const fn with_reveal_unknown_reset_accounts(mut self, reveal: bool) -> Self {
        self.reveal_unknown_reset_accounts = reveal;
        self
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::new(
            "http://localhost:3000".to_string(),
            "dev-only-secret-change-me-0123456789abcdef".to_string(),
        )
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("base_url", &self.base_url)
            .field("jwt_secret", &"<redacted>")
            .field("access_token_ttl", &self.access_token_ttl)
            .field("refresh_token_ttl", &self.refresh_token_ttl)
            .field("email_verification_ttl", &self.email_verification_ttl)
            .field("verified_email_ttl", &self.verified_email_ttl)
            .field("password_reset_ttl", &self.password_reset_ttl)
            .field(
                "reveal_unknown_reset_accounts",
                &self.reveal_unknown_reset_accounts,
            )
            .finish()
    }
}

//! Authentication constants.

/// Default lifetimes for issued credentials and one-time records.
pub mod ttl {
    /// Access token validity, in seconds (1 hour).
    pub const ACCESS_TOKEN_SECS: i64 = 60 * 60;

    /// Refresh token validity, in seconds (7 days).
    pub const REFRESH_TOKEN_SECS: i64 = 7 * 24 * 60 * 60;

    /// Email verification link validity, in seconds (30 minutes).
    pub const EMAIL_VERIFICATION_SECS: i64 = 30 * 60;

    /// How long a confirmed email may be used to register, in seconds (24 hours).
    pub const VERIFIED_EMAIL_SECS: i64 = 24 * 60 * 60;

    /// Password reset link validity, in seconds (30 minutes).
    pub const PASSWORD_RESET_SECS: i64 = 30 * 60;
}

/// Entropy, in bytes, of generated opaque tokens.
pub mod entropy {
    /// Refresh tokens.
    pub const REFRESH_TOKEN_BYTES: usize = 64;

    /// Email verification and password reset tokens.
    pub const ONE_TIME_TOKEN_BYTES: usize = 32;
}

/// Paths embedded in emailed links, relative to the public base URL.
pub mod links {
    /// Email verification landing path.
    pub const VERIFY_EMAIL_PATH: &str = "/auth/verify-email";

    /// Password reset landing path.
    pub const RESET_PASSWORD_PATH: &str = "/auth/reset-password";
}

/// Default bcrypt work factor.
pub const DEFAULT_BCRYPT_COST: u32 = 10;

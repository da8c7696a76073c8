//! Authentication environment.
//!
//! Bundles the external dependencies of [`crate::service::AuthService`] so
//! they are injected once at construction instead of reached for globally.

use crate::providers::{Clock, EmailProvider, MemberRepository, PasswordHasher, TokenStore};
use std::sync::Arc;

/// Authentication environment.
///
/// # Type Parameters
///
/// - `M`: Member repository (`PostgreSQL`)
/// - `T`: Ephemeral token store (`Redis`)
/// - `E`: Email provider
/// - `H`: Password hasher
#[derive(Clone)]
pub struct AuthEnvironment<M, T, E, H>
where
    M: MemberRepository + Clone,
    T: TokenStore + Clone,
    E: EmailProvider + Clone,
    H: PasswordHasher + Clone,
{
    /// Member and pharmacy records.
    pub members: M,

    /// Refresh, verification, and reset tokens with store-enforced TTL.
    pub tokens: T,

    /// Email provider.
    pub email: E,

    /// Password hasher.
    pub hasher: H,

    /// Time source.
    pub clock: Arc<dyn Clock>,
}

impl<M, T, E, H> AuthEnvironment<M, T, E, H>
where
    M: MemberRepository + Clone,
    T: TokenStore + Clone,
    E: EmailProvider + Clone,
    H: PasswordHasher + Clone,
{
    /// Create a new authentication environment.
    #[must_use]
    pub fn new(members: M, tokens: T, email: E, hasher: H, clock: Arc<dyn Clock>) -> Self {
        Self {
            members,
            tokens,
            email,
            hasher,
            clock,
        }
    }
}

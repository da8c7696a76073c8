//! Access-token authentication for handlers.

use crate::providers::{EmailProvider, MemberRepository, PasswordHasher, TokenStore};
use crate::service::AuthService;
use crate::tokens::AccessClaims;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use pharmacy_web::{AppError, BearerToken};

/// Verified claims of the caller's access token.
///
/// Reads `Authorization: Bearer <jwt>` and verifies it against the service's
/// issuer. Rejects with 401 when the header is missing, the token is
/// malformed or forged, or it has expired.
///
/// # Example
///
/// ```ignore
/// async fn handler(AuthenticatedMember(claims): AuthenticatedMember) {
///     tracing::info!(member_id = %claims.member_id, "Authenticated");
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthenticatedMember(pub AccessClaims);

#[async_trait]
impl<M, T, E, H> FromRequestParts<AuthService<M, T, E, H>> for AuthenticatedMember
where
    M: MemberRepository + Clone + 'static,
    T: TokenStore + Clone + 'static,
    E: EmailProvider + Clone + 'static,
    H: PasswordHasher + Clone + 'static,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        service: &AuthService<M, T, E, H>,
    ) -> Result<Self, Self::Rejection> {
        let BearerToken(token) = BearerToken::from_request_parts(parts, service).await?;
        let claims = service.authenticate(&token).map_err(|e| {
            tracing::debug!(error = %e, "Rejected access token");
            AppError::from(e)
        })?;
        Ok(Self(claims))
    }
}

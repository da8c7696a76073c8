//! Access token issuance and verification.
//!
//! Access tokens are HS256 JWTs carrying the member and pharmacy IDs. They are
//! never stored: verification is a signature check plus an expiry check
//! against the injected [`Clock`], so the request path never touches the
//! token store.

use crate::error::{AuthError, Result};
use crate::providers::Clock;
use crate::state::{MemberId, PharmacyId};
use chrono::Duration;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Identity claims carried by an access token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessClaims {
    /// Authenticated member.
    pub member_id: MemberId,
    /// Pharmacy owned by the member at issuance time.
    pub pharmacy_id: PharmacyId,
}

/// Wire form of the JWT payload.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JwtPayload {
    member_id: i64,
    pharmacy_id: i64,
    /// Issued at (Unix timestamp).
    iat: i64,
    /// Expiration (Unix timestamp).
    exp: i64,
}

/// Signs and verifies access tokens.
#[derive(Clone)]
pub struct AccessTokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl AccessTokenIssuer {
    /// Create an issuer for the given HMAC secret and default validity.
    #[must_use]
    pub fn new(secret: &[u8], ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against the injected clock instead.
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl,
            clock,
        }
    }

    /// Default validity of issued tokens.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token valid for the default TTL.
    ///
    /// # Errors
    ///
    /// Returns `TokenSigningError` if encoding fails.
    pub fn issue(&self, claims: AccessClaims) -> Result<String> {
        self.issue_with_ttl(claims, self.ttl)
    }

    /// Issue a token valid for `ttl`.
    ///
    /// # Errors
    ///
    /// Returns `TokenSigningError` if encoding fails.
    pub fn issue_with_ttl(&self, claims: AccessClaims, ttl: Duration) -> Result<String> {
        let now = self.clock.now();
        let payload = JwtPayload {
            member_id: claims.member_id.0,
            pharmacy_id: claims.pharmacy_id.0,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &payload, &self.encoding_key)
            .map_err(|e| AuthError::TokenSigningError(e.to_string()))
    }

    /// Verify a token and return its claims.
    ///
    /// # Errors
    ///
    /// - `InvalidAccessToken` if the token is malformed or the signature does not match
    /// - `AccessTokenExpired` if the validity window has passed
    pub fn verify(&self, token: &str) -> Result<AccessClaims> {
        let data = decode::<JwtPayload>(token, &self.decoding_key, &self.validation).map_err(|e| {
            tracing::debug!(error = %e, "Access token rejected");
            AuthError::InvalidAccessToken
        })?;
        let payload = data.claims;

        if payload.exp <= self.clock.now().timestamp() {
            return Err(AuthError::AccessTokenExpired);
        }

        Ok(AccessClaims {
            member_id: MemberId(payload.member_id),
            pharmacy_id: PharmacyId(payload.pharmacy_id),
        })
    }
}

impl std::fmt::Debug for AccessTokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessTokenIssuer")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

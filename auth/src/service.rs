//! Credential lifecycle orchestration.
//!
//! [`AuthService`] is the only place that mutates members or ephemeral
//! tokens. Each public method is one complete flow:
//!
//! ```text
//! login ──► (access, refresh) ──► refresh ──► access
//!                    └──────────► logout
//!
//! send_verification_email ──► verify_email ──► register
//! send_password_reset ──────► reset_password
//! check_password / deactivate_account   (authenticated)
//! ```
//!
//! Ephemeral records are JSON payloads under [`TokenKey`] namespaces; expiry
//! is left entirely to the store.

use crate::config::AuthConfig;
use crate::constants::entropy::{ONE_TIME_TOKEN_BYTES, REFRESH_TOKEN_BYTES};
use crate::environment::AuthEnvironment;
use crate::error::{AuthError, Result};
use crate::providers::{
    Clock, EmailProvider, MemberRepository, PasswordHasher, TokenKey, TokenStore, templates,
};
use crate::state::{
    AccessToken, Member, MemberId, NewMember, NewPharmacy, PharmacyId, PharmacyProfile,
    PharmacyProfileUpdate, Registration, TokenPair,
};
use crate::tokens::{AccessClaims, AccessTokenIssuer};
use crate::utils::{generate_token, token_prefix, validate_email};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

/// Payload of `refresh_token:` records.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MemberRecord {
    member_id: MemberId,
}

/// Payload of `password_verif:` records.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResetRecord {
    member_id: MemberId,
    expires_at: DateTime<Utc>,
}

/// Payload of `email_verif:` records.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EmailRecord {
    email: String,
    expires_at: DateTime<Utc>,
}

/// Marker value of `email_verified:` records.
const VERIFIED: &str = "true";

/// Auth orchestrator.
///
/// Cheap to clone; clones share providers and the issuer.
#[derive(Clone)]
pub struct AuthService<M, T, E, H>
where
    M: MemberRepository + Clone,
    T: TokenStore + Clone,
    E: EmailProvider + Clone,
    H: PasswordHasher + Clone,
{
    env: AuthEnvironment<M, T, E, H>,
    config: Arc<AuthConfig>,
    issuer: AccessTokenIssuer,
    /// Digest checked when the login email is unknown, so both paths pay for a bcrypt verify.
    decoy_hash: Arc<OnceCell<String>>,
}

impl<M, T, E, H> AuthService<M, T, E, H>
where
    M: MemberRepository + Clone,
    T: TokenStore + Clone,
    E: EmailProvider + Clone,
    H: PasswordHasher + Clone,
{
    /// Create the orchestrator.
    #[must_use]
    pub fn new(env: AuthEnvironment<M, T, E, H>, config: AuthConfig) -> Self {
        let issuer = AccessTokenIssuer::new(
            config.jwt_secret.as_bytes(),
            config.access_token_ttl,
            Arc::clone(&env.clock),
        );
        Self {
            env,
            config: Arc::new(config),
            issuer,
            decoy_hash: Arc::new(OnceCell::new()),
        }
    }

    /// Access token issuer, for request authentication.
    #[must_use]
    pub const fn issuer(&self) -> &AccessTokenIssuer {
        &self.issuer
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Verify a bearer access token.
    ///
    /// # Errors
    ///
    /// `InvalidAccessToken` or `AccessTokenExpired`.
    pub fn authenticate(&self, access_token: &str) -> Result<AccessClaims> {
        self.issuer.verify(access_token)
    }

    // ═══════════════════════════════════════════════════════════════════
    // Sessions
    // ═══════════════════════════════════════════════════════════════════

    /// Exchange email and password for an access token and a refresh token.
    ///
    /// # Errors
    ///
    /// - `InvalidEmail` if the address is malformed
    /// - `AccountNotFound` if there is no active member with this email
    /// - `MissingPharmacy` if the member owns no pharmacy
    /// - `InvalidCredentials` if the password does not match
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair> {
        validate_email(email)?;

        let Some(member) = self.env.members.find_active_by_email(email).await? else {
            self.burn_decoy_verify(password).await;
            warn!(email = %email, "Login rejected: no such account");
            return Err(AuthError::AccountNotFound);
        };

        let pharmacy_id = self.pharmacy_of(member.id).await?;

        if !self.env.hasher.verify(password, &member.password_hash).await {
            warn!(member_id = %member.id, "Login rejected: bad credentials");
            return Err(AuthError::InvalidCredentials);
        }

        let access_token = self.issuer.issue(AccessClaims {
            member_id: member.id,
            pharmacy_id,
        })?;
        let refresh_token = self.store_refresh_token(member.id).await?;

        info!(member_id = %member.id, pharmacy_id = %pharmacy_id, "Member logged in");

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Issue a fresh access token for a live refresh token.
    ///
    /// The refresh token is not rotated: it stays valid until its own TTL
    /// elapses or it is revoked by logout or deactivation.
    ///
    /// # Errors
    ///
    /// - `InvalidRefreshToken` if the token is unknown, expired, or revoked
    /// - `AccountNotFound` if the member is no longer active
    /// - `MissingPharmacy` if the member owns no pharmacy
    pub async fn refresh(&self, refresh_token: &str) -> Result<AccessToken> {
        let key = TokenKey::Refresh(refresh_token.to_string());
        let Some(raw) = self.env.tokens.get(&key).await? else {
            warn!(token = %token_prefix(refresh_token), "Refresh rejected: unknown token");
            return Err(AuthError::InvalidRefreshToken);
        };
        let record: MemberRecord = serde_json::from_str(&raw)?;

        let Some(member) = self.env.members.find_active_by_id(record.member_id).await? else {
            warn!(member_id = %record.member_id, "Refresh rejected: member inactive");
            return Err(AuthError::AccountNotFound);
        };
        let pharmacy_id = self.pharmacy_of(member.id).await?;

        let access_token = self.issuer.issue(AccessClaims {
            member_id: member.id,
            pharmacy_id,
        })?;
        debug!(member_id = %member.id, "Access token refreshed");

        Ok(AccessToken { access_token })
    }

    /// Revoke a refresh token. Unknown tokens are ignored.
    ///
    /// # Errors
    ///
    /// `TokenStoreError` if the store is unreachable.
    pub async fn logout(&self, refresh_token: &str) -> Result<()> {
        let key = TokenKey::Refresh(refresh_token.to_string());
        match self.env.tokens.take(&key).await? {
            Some(raw) => {
                match serde_json::from_str::<MemberRecord>(&raw) {
                    Ok(record) => {
                        self.env
                            .tokens
                            .index_remove(
                                &TokenKey::MemberRefreshIndex(record.member_id),
                                refresh_token,
                            )
                            .await?;
                        info!(member_id = %record.member_id, "Member logged out");
                    }
                    Err(e) => warn!(error = %e, "Revoked refresh token with unreadable payload"),
                }
            }
            None => debug!(token = %token_prefix(refresh_token), "Logout of unknown refresh token"),
        }
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════
    // Email Verification & Registration
    // ═══════════════════════════════════════════════════════════════════

    /// Email a verification link for `email`.
    ///
    /// Does not consult the member table, so it reveals nothing about
    /// existing accounts. If delivery fails the stored token remains and the
    /// caller may simply ask again.
    ///
    /// # Errors
    ///
    /// - `InvalidEmail` if the address is malformed
    /// - `TokenStoreError` / `EmailError` on dependency failure
    pub async fn send_verification_email(&self, email: &str) -> Result<()> {
        validate_email(email)?;

        let token = generate_token(ONE_TIME_TOKEN_BYTES);
        let record = serde_json::to_string(&EmailRecord {
            email: email.to_string(),
            expires_at: self.env.clock.now() + self.config.email_verification_ttl,
        })?;
        self.env
            .tokens
            .put(
                &TokenKey::EmailVerification(token.clone()),
                &record,
                self.config.email_verification_ttl,
            )
            .await?;

        let link = templates::verification_link(&self.config.base_url, &token);
        let mail = templates::verification_email(email, &link, self.config.email_verification_ttl);
        if let Err(e) = self.env.email.send(mail).await {
            warn!(email = %email, error = %e, "Verification email not delivered");
            return Err(e);
        }

        info!(email = %email, token = %token_prefix(&token), "Verification email sent");
        Ok(())
    }

    /// Consume a verification token and mark its email as registrable.
    ///
    /// If the verified record cannot be written, the token is put back for
    /// the rest of its lifetime so the same link works on retry.
    ///
    /// # Errors
    ///
    /// - `InvalidVerificationLink` if the token is unknown, expired, or already used
    /// - `TokenStoreError` if the store is unreachable
    pub async fn verify_email(&self, token: &str) -> Result<()> {
        let key = TokenKey::EmailVerification(token.to_string());
        let Some(raw) = self.env.tokens.take(&key).await? else {
            warn!(token = %token_prefix(token), "Verification rejected: invalid link");
            return Err(AuthError::InvalidVerificationLink);
        };
        let record: EmailRecord = serde_json::from_str(&raw)?;

        if let Err(e) = self
            .env
            .tokens
            .put(
                &TokenKey::VerifiedEmail(record.email.clone()),
                VERIFIED,
                self.config.verified_email_ttl,
            )
            .await
        {
            self.restore_one_time_token(&key, &raw, record.expires_at).await;
            return Err(e);
        }

        info!(email = %record.email, "Email verified");
        Ok(())
    }

    /// Create a member and its pharmacy for a verified email.
    ///
    /// # Errors
    ///
    /// - `InvalidEmail` if the address is malformed
    /// - `EmailNotVerified` if there is no live verification record for the email
    /// - `EmailAlreadyRegistered` if the email is taken (including a concurrent registration)
    pub async fn register(&self, registration: Registration) -> Result<()> {
        validate_email(&registration.email)?;

        let verified_key = TokenKey::VerifiedEmail(registration.email.clone());
        if self.env.tokens.get(&verified_key).await?.is_none() {
            warn!(email = %registration.email, "Registration rejected: email not verified");
            return Err(AuthError::EmailNotVerified);
        }

        let password_hash = self.env.hasher.hash(&registration.password).await?;

        let (member_id, pharmacy_id) = self
            .env
            .members
            .create_member_with_pharmacy(
                NewMember {
                    email: registration.email.clone(),
                    password_hash,
                    license_code: registration.license_code,
                },
                NewPharmacy {
                    pharmacy_name: registration.name,
                    address: registration.address,
                    latitude: registration.latitude,
                    longitude: registration.longitude,
                },
            )
            .await
            .inspect_err(|e| {
                if matches!(e, AuthError::EmailAlreadyRegistered) {
                    warn!(email = %registration.email, "Registration rejected: email taken");
                }
            })?;

        if let Err(e) = self.env.tokens.delete(&verified_key).await {
            warn!(
                member_id = %member_id,
                error = %e,
                "Verified email record not cleared; it expires on its own"
            );
        }

        info!(member_id = %member_id, pharmacy_id = %pharmacy_id, "Member registered");
        Ok(())
    }

    /// Whether `email` is free for registration.
    ///
    /// Deactivated accounts keep their email, so they count as taken.
    ///
    /// # Errors
    ///
    /// - `InvalidEmail` if the address is malformed
    pub async fn check_email(&self, email: &str) -> Result<bool> {
        validate_email(email)?;
        Ok(!self.env.members.email_exists(email).await?)
    }

    // ═══════════════════════════════════════════════════════════════════
    // Password Reset
    // ═══════════════════════════════════════════════════════════════════

    /// Email a password reset link to an active member.
    ///
    /// Unknown or deactivated accounts get the same acknowledgment as real
    /// ones unless `reveal_unknown_reset_accounts` is set.
    ///
    /// # Errors
    ///
    /// - `InvalidEmail` if the address is malformed
    /// - `AccountNotFound` for unknown accounts when disclosure is enabled
    /// - `TokenStoreError` / `EmailError` on dependency failure
    pub async fn send_password_reset(&self, email: &str) -> Result<()> {
        validate_email(email)?;

        let Some(member) = self.env.members.find_active_by_email(email).await? else {
            debug!(email = %email, "Password reset requested for unknown account");
            return if self.config.reveal_unknown_reset_accounts {
                Err(AuthError::AccountNotFound)
            } else {
                Ok(())
            };
        };

        let token = generate_token(ONE_TIME_TOKEN_BYTES);
        let record = serde_json::to_string(&ResetRecord {
            member_id: member.id,
            expires_at: self.env.clock.now() + self.config.password_reset_ttl,
        })?;
        self.env
            .tokens
            .put(
                &TokenKey::PasswordReset(token.clone()),
                &record,
                self.config.password_reset_ttl,
            )
            .await?;

        let link = templates::reset_link(&self.config.base_url, &token);
        let mail = templates::password_reset_email(email, &link, self.config.password_reset_ttl);
        if let Err(e) = self.env.email.send(mail).await {
            warn!(member_id = %member.id, error = %e, "Password reset email not delivered");
            return Err(e);
        }

        info!(member_id = %member.id, "Password reset email sent");
        Ok(())
    }

    /// Set a new password using a reset token.
    ///
    /// A hashing or database failure puts the token back for the rest of its
    /// lifetime, so the same link works on retry.
    ///
    /// # Errors
    ///
    /// - `InvalidResetToken` if the token is unknown, expired, already used,
    ///   or its member is no longer active
    /// - `HashingError` / `DatabaseError` / `TokenStoreError` on dependency failure
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<()> {
        let key = TokenKey::PasswordReset(token.to_string());
        let Some(raw) = self.env.tokens.take(&key).await? else {
            warn!(token = %token_prefix(token), "Password reset rejected: invalid token");
            return Err(AuthError::InvalidResetToken);
        };
        let record: ResetRecord = serde_json::from_str(&raw)?;

        let updated = match self.write_new_password(record.member_id, new_password).await {
            Ok(updated) => updated,
            Err(e) => {
                self.restore_one_time_token(&key, &raw, record.expires_at).await;
                return Err(e);
            }
        };
        if !updated {
            warn!(member_id = %record.member_id, "Password reset for inactive member");
            return Err(AuthError::InvalidResetToken);
        }

        info!(member_id = %record.member_id, "Password reset");
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════
    // Authenticated Account Operations
    // ═══════════════════════════════════════════════════════════════════

    /// Re-authenticate an already logged-in member.
    ///
    /// # Errors
    ///
    /// - `AccountNotFound` if the member is no longer active
    /// - `InvalidCredentials` if the password does not match
    pub async fn check_password(&self, member_id: MemberId, password: &str) -> Result<()> {
        self.password_gate(member_id, password).await.map(|_| ())
    }

    /// Soft-delete a member and its pharmacy and revoke every refresh token.
    ///
    /// Access tokens already issued stay valid until they expire.
    ///
    /// # Errors
    ///
    /// - `AccountNotFound` if the member is no longer active
    /// - `InvalidCredentials` if the password does not match
    pub async fn deactivate_account(&self, member_id: MemberId, password: &str) -> Result<()> {
        let member = self.password_gate(member_id, password).await?;

        self.env
            .members
            .deactivate(member.id, self.env.clock.now())
            .await?;
        let revoked = self.revoke_refresh_tokens(member.id).await?;

        info!(member_id = %member.id, revoked, "Account deactivated");
        Ok(())
    }

    /// Pharmacy profile of an active member.
    ///
    /// # Errors
    ///
    /// - `AccountNotFound` if the member or pharmacy is no longer active
    pub async fn profile(&self, member_id: MemberId) -> Result<PharmacyProfile> {
        self.env
            .members
            .profile(member_id)
            .await?
            .ok_or(AuthError::AccountNotFound)
    }

    /// Update the pharmacy profile of an active member.
    ///
    /// # Errors
    ///
    /// - `AccountNotFound` if the member or pharmacy is no longer active
    pub async fn update_profile(
        &self,
        member_id: MemberId,
        update: PharmacyProfileUpdate,
    ) -> Result<()> {
        if self.env.members.update_profile(member_id, update).await? {
            info!(member_id = %member_id, "Pharmacy profile updated");
            Ok(())
        } else {
            Err(AuthError::AccountNotFound)
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Helpers
    // ═══════════════════════════════════════════════════════════════════

    async fn pharmacy_of(&self, member_id: MemberId) -> Result<PharmacyId> {
        self.env
            .members
            .find_pharmacy_id(member_id)
            .await?
            .ok_or_else(|| {
                tracing::error!(member_id = %member_id, "Active member has no pharmacy");
                AuthError::MissingPharmacy {
                    member_id: member_id.0,
                }
            })
    }

    async fn password_gate(&self, member_id: MemberId, password: &str) -> Result<Member> {
        let member = self
            .env
            .members
            .find_active_by_id(member_id)
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        if self.env.hasher.verify(password, &member.password_hash).await {
            Ok(member)
        } else {
            warn!(member_id = %member_id, "Password check failed");
            Err(AuthError::InvalidCredentials)
        }
    }

    async fn store_refresh_token(&self, member_id: MemberId) -> Result<String> {
        let token = generate_token(REFRESH_TOKEN_BYTES);
        let record = serde_json::to_string(&MemberRecord { member_id })?;
        let ttl = self.config.refresh_token_ttl;

        self.env
            .tokens
            .put(&TokenKey::Refresh(token.clone()), &record, ttl)
            .await?;
        self.env
            .tokens
            .index_add(&TokenKey::MemberRefreshIndex(member_id), &token, ttl)
            .await?;

        Ok(token)
    }

    async fn revoke_refresh_tokens(&self, member_id: MemberId) -> Result<usize> {
        let tokens = self
            .env
            .tokens
            .index_drain(&TokenKey::MemberRefreshIndex(member_id))
            .await?;
        for token in &tokens {
            self.env.tokens.delete(&TokenKey::Refresh(token.clone())).await?;
        }
        Ok(tokens.len())
    }

    async fn write_new_password(&self, member_id: MemberId, new_password: &str) -> Result<bool> {
        let password_hash = self.env.hasher.hash(new_password).await?;
        self.env
            .members
            .update_password(member_id, &password_hash)
            .await
    }

    /// Put a consumed one-time token back until its original expiry.
    async fn restore_one_time_token(
        &self,
        key: &TokenKey,
        raw: &str,
        expires_at: DateTime<Utc>,
    ) {
        let remaining = expires_at - self.env.clock.now();
        if remaining <= Duration::zero() {
            return;
        }
        match self.env.tokens.put(key, raw, remaining).await {
            Ok(()) => debug!(
                namespace = key.prefix(),
                "One-time token restored after failed write"
            ),
            Err(e) => warn!(
                namespace = key.prefix(),
                error = %e,
                "One-time token lost after failed write"
            ),
        }
    }

    async fn burn_decoy_verify(&self, password: &str) {
        let decoy = self
            .decoy_hash
            .get_or_try_init(|| self.env.hasher.hash("decoy-password-for-timing"))
            .await;
        if let Ok(digest) = decoy {
            let _ = self.env.hasher.verify(password, digest).await;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;
    use crate::mocks::{ManualClock, MockEmailProvider, MockMemberRepository, MockTokenStore};
    use crate::providers::BcryptPasswordHasher;

    type TestService =
        AuthService<MockMemberRepository, MockTokenStore, MockEmailProvider, BcryptPasswordHasher>;

    struct Harness {
        service: TestService,
        members: MockMemberRepository,
        tokens: MockTokenStore,
        email: MockEmailProvider,
        clock: ManualClock,
    }

    fn harness() -> Harness {
        let clock = ManualClock::new();
        let members = MockMemberRepository::new();
        let tokens = MockTokenStore::with_clock(Arc::new(clock.clone()));
        let email = MockEmailProvider::new();
        let env = AuthEnvironment::new(
            members.clone(),
            tokens.clone(),
            email.clone(),
            BcryptPasswordHasher::new(4),
            Arc::new(clock.clone()),
        );
        let service = AuthService::new(env, AuthConfig::default());
        Harness {
            service,
            members,
            tokens,
            email,
            clock,
        }
    }

    fn registration(email: &str, password: &str) -> Registration {
        Registration {
            name: "Corner Pharmacy".to_string(),
            email: email.to_string(),
            password: password.to_string(),
            latitude: 37.5,
            longitude: 127.0,
            address: "1 Main St".to_string(),
            license_code: "L-42".to_string(),
        }
    }

    async fn register(h: &Harness, email: &str, password: &str) {
        h.service.send_verification_email(email).await.unwrap();
        let token = h.email.last_token_for(email).unwrap();
        h.service.verify_email(&token).await.unwrap();
        h.service.register(registration(email, password)).await.unwrap();
    }

    #[tokio::test]
    async fn test_login_stores_refresh_record() {
        let h = harness();
        register(&h, "a@x.com", "pw").await;

        let pair = h.service.login("a@x.com", "pw").await.unwrap();
        let key = TokenKey::Refresh(pair.refresh_token.clone());
        let raw = h.tokens.get(&key).await.unwrap().unwrap();
        assert!(raw.contains("\"memberId\""));

        let member = h.members.find_any_by_email("a@x.com").unwrap();
        let claims = h.service.authenticate(&pair.access_token).unwrap();
        assert_eq!(claims.member_id, member.id);
    }

    #[tokio::test]
    async fn test_stored_hash_uses_hasher_cost() {
        let h = harness();
        register(&h, "a@x.com", "pw").await;

        let member = h.members.find_any_by_email("a@x.com").unwrap();
        assert!(member.password_hash.starts_with("$2b$04$"));
    }

    #[tokio::test]
    async fn test_login_unknown_email() {
        let h = harness();
        assert_eq!(
            h.service.login("ghost@x.com", "pw").await,
            Err(AuthError::AccountNotFound)
        );
    }

    #[tokio::test]
    async fn test_login_invalid_email_syntax() {
        let h = harness();
        assert_eq!(
            h.service.login("not-an-email", "pw").await,
            Err(AuthError::InvalidEmail)
        );
    }

    #[tokio::test]
    async fn test_missing_pharmacy_is_internal() {
        let h = harness();
        let hash = BcryptPasswordHasher::new(4).hash("pw").await.unwrap();
        let member_id = h.members.insert_orphan_member("orphan@x.com", &hash);

        assert_eq!(
            h.service.login("orphan@x.com", "pw").await,
            Err(AuthError::MissingPharmacy {
                member_id: member_id.0
            })
        );
    }

    #[tokio::test]
    async fn test_refresh_token_expires() {
        let h = harness();
        register(&h, "a@x.com", "pw").await;
        let pair = h.service.login("a@x.com", "pw").await.unwrap();

        h.clock.advance(Duration::days(7));
        assert_eq!(
            h.service.refresh(&pair.refresh_token).await,
            Err(AuthError::InvalidRefreshToken)
        );
    }

    #[tokio::test]
    async fn test_logout_removes_from_index() {
        let h = harness();
        register(&h, "a@x.com", "pw").await;
        let pair = h.service.login("a@x.com", "pw").await.unwrap();

        h.service.logout(&pair.refresh_token).await.unwrap();
        assert!(h.tokens.keys_with_prefix("refresh_token").is_empty());
        assert!(h.tokens.keys_with_prefix("member_refresh_tokens").is_empty());
    }

    #[tokio::test]
    async fn test_verification_mail_failure_keeps_token() {
        let h = harness();
        h.email.set_failing(true);

        let result = h.service.send_verification_email("a@x.com").await;
        assert!(matches!(result, Err(AuthError::EmailError(_))));
        assert_eq!(h.tokens.keys_with_prefix("email_verif").len(), 1);
    }

    #[tokio::test]
    async fn test_register_consumes_verified_record() {
        let h = harness();
        register(&h, "a@x.com", "pw").await;
        assert!(h.tokens.keys_with_prefix("email_verified").is_empty());

        // A second registration needs a fresh verification
        assert_eq!(
            h.service.register(registration("a@x.com", "pw")).await,
            Err(AuthError::EmailNotVerified)
        );
    }

    #[tokio::test]
    async fn test_verified_record_expires() {
        let h = harness();
        h.service.send_verification_email("a@x.com").await.unwrap();
        let token = h.email.last_token_for("a@x.com").unwrap();
        h.service.verify_email(&token).await.unwrap();

        h.clock.advance(Duration::hours(24));
        assert_eq!(
            h.service.register(registration("a@x.com", "pw")).await,
            Err(AuthError::EmailNotVerified)
        );
    }

    #[tokio::test]
    async fn test_verify_email_keeps_link_when_store_write_fails() {
        let h = harness();
        h.service.send_verification_email("a@x.com").await.unwrap();
        let token = h.email.last_token_for("a@x.com").unwrap();

        h.tokens.fail_next_puts(1);
        assert!(matches!(
            h.service.verify_email(&token).await,
            Err(AuthError::TokenStoreError(_))
        ));

        h.service.verify_email(&token).await.unwrap();
        h.service.register(registration("a@x.com", "pw")).await.unwrap();
    }

    #[tokio::test]
    async fn test_restored_link_keeps_original_expiry() {
        let h = harness();
        h.service.send_verification_email("a@x.com").await.unwrap();
        let token = h.email.last_token_for("a@x.com").unwrap();

        h.clock.advance(Duration::minutes(20));
        h.tokens.fail_next_puts(1);
        assert!(h.service.verify_email(&token).await.is_err());

        h.clock.advance(Duration::minutes(10));
        assert_eq!(
            h.service.verify_email(&token).await,
            Err(AuthError::InvalidVerificationLink)
        );
    }

    #[tokio::test]
    async fn test_reset_password_keeps_link_when_database_fails() {
        let h = harness();
        register(&h, "a@x.com", "pw").await;
        h.service.send_password_reset("a@x.com").await.unwrap();
        let token = h.email.last_token_for("a@x.com").unwrap();

        h.members.set_unavailable(true);
        assert!(matches!(
            h.service.reset_password(&token, "new").await,
            Err(AuthError::DatabaseError(_))
        ));
        h.members.set_unavailable(false);

        h.service.reset_password(&token, "new").await.unwrap();
        h.service.login("a@x.com", "new").await.unwrap();
        assert!(h.tokens.keys_with_prefix("password_verif").is_empty());
    }

    #[tokio::test]
    async fn test_register_succeeds_when_verified_record_cleanup_fails() {
        let h = harness();
        h.service.send_verification_email("a@x.com").await.unwrap();
        let token = h.email.last_token_for("a@x.com").unwrap();
        h.service.verify_email(&token).await.unwrap();

        h.tokens.fail_next_deletes(1);
        h.service.register(registration("a@x.com", "pw")).await.unwrap();
        assert_eq!(h.members.member_count(), 1);

        // The leftover record lapses on its own TTL
        h.clock.advance(Duration::hours(24));
        assert!(h.tokens.keys_with_prefix("email_verified").is_empty());
    }

    #[tokio::test]
    async fn test_reset_for_unknown_account_is_silent_by_default() {
        let h = harness();
        h.service.send_password_reset("ghost@x.com").await.unwrap();
        assert!(h.email.sent().is_empty());
        assert!(h.tokens.keys().is_empty());
    }

    #[tokio::test]
    async fn test_reset_for_unknown_account_disclosed_when_configured() {
        let clock = ManualClock::new();
        let env = AuthEnvironment::new(
            MockMemberRepository::new(),
            MockTokenStore::with_clock(Arc::new(clock.clone())),
            MockEmailProvider::new(),
            BcryptPasswordHasher::new(4),
            Arc::new(clock),
        );
        let service = AuthService::new(
            env,
            AuthConfig::default().with_reveal_unknown_reset_accounts(true),
        );

        assert_eq!(
            service.send_password_reset("ghost@x.com").await,
            Err(AuthError::AccountNotFound)
        );
    }

    #[tokio::test]
    async fn test_reset_token_for_deactivated_member() {
        let h = harness();
        register(&h, "a@x.com", "pw").await;
        h.service.send_password_reset("a@x.com").await.unwrap();
        let token = h.email.last_token_for("a@x.com").unwrap();

        let member = h.members.find_any_by_email("a@x.com").unwrap();
        h.service.deactivate_account(member.id, "pw").await.unwrap();

        assert_eq!(
            h.service.reset_password(&token, "new").await,
            Err(AuthError::InvalidResetToken)
        );
    }

    #[tokio::test]
    async fn test_profile_round_trip() {
        let h = harness();
        register(&h, "a@x.com", "pw").await;
        let member = h.members.find_any_by_email("a@x.com").unwrap();

        let profile = h.service.profile(member.id).await.unwrap();
        assert_eq!(profile.pharmacy_name, "Corner Pharmacy");
        assert_eq!(profile.license_code, "L-42");

        h.service
            .update_profile(
                member.id,
                PharmacyProfileUpdate {
                    pharmacy_name: "New Name".to_string(),
                    address: profile.address.clone(),
                    phone: Some("010-0000-0000".to_string()),
                    latitude: profile.latitude,
                    longitude: profile.longitude,
                    open_time: None,
                    close_time: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(
            h.service.profile(member.id).await.unwrap().pharmacy_name,
            "New Name"
        );
    }

    #[tokio::test]
    async fn test_profile_of_deactivated_member() {
        let h = harness();
        register(&h, "a@x.com", "pw").await;
        let member = h.members.find_any_by_email("a@x.com").unwrap();
        h.service.deactivate_account(member.id, "pw").await.unwrap();

        assert_eq!(
            h.service.profile(member.id).await,
            Err(AuthError::AccountNotFound)
        );
    }
}

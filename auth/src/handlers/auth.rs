//! Credential lifecycle endpoints.
//!
//! Every handler takes `State<AuthService<..>>`; bodies are camelCase JSON.
//! A malformed body is rejected with 422 `VALIDATION_ERROR` before the
//! service is called.

use super::{Ack, AuthenticatedMember};
use crate::providers::{EmailProvider, MemberRepository, PasswordHasher, TokenStore};
use crate::service::AuthService;
use crate::state::{AccessToken, Registration, TokenPair};
use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};
use pharmacy_web::{AppError, CorrelationId};
use serde::{Deserialize, Serialize};

/// Email and password.
#[derive(Clone, Deserialize)]
pub struct LoginRequest {
    /// Account email.
    pub email: String,
    /// Plaintext password.
    pub password: String,
}

/// A refresh token, for `refresh` and `logout`.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    /// Opaque refresh token.
    pub refresh_token: String,
}

/// Body carrying only an email address.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailRequest {
    /// Email address.
    pub email: String,
}

/// Result of `check-email`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckEmailResponse {
    /// `true` if no account uses the address.
    pub is_unique: bool,
}

/// `?token=` of an emailed link.
#[derive(Clone, Deserialize)]
pub struct TokenQuery {
    /// One-time token.
    pub token: String,
}

/// New password with its reset token.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    /// One-time reset token.
    pub token: String,
    /// Replacement password.
    pub new_password: String,
}

/// Password re-entry for sensitive operations.
#[derive(Clone, Deserialize)]
pub struct PasswordRequest {
    /// Current password.
    pub password: String,
}

/// Log in.
///
/// # Endpoint
///
/// ```text
/// POST /auth/login
/// { "email": "owner@pharmacy.example", "password": "..." }
/// ```
///
/// # Response
///
/// ```json
/// { "accessToken": "eyJ...", "refreshToken": "..." }
/// ```
pub async fn login<M, T, E, H>(
    State(service): State<AuthService<M, T, E, H>>,
    correlation_id: CorrelationId,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<TokenPair>, AppError>
where
    M: MemberRepository + Clone + 'static,
    T: TokenStore + Clone + 'static,
    E: EmailProvider + Clone + 'static,
    H: PasswordHasher + Clone + 'static,
{
    let Json(request) = payload?;
    tracing::debug!(correlation_id = %correlation_id.0, "Login request");

    let tokens = service.login(&request.email, &request.password).await?;
    Ok(Json(tokens))
}

/// Exchange a refresh token for a new access token.
///
/// ```text
/// POST /auth/refresh
/// { "refreshToken": "..." }
/// ```
pub async fn refresh<M, T, E, H>(
    State(service): State<AuthService<M, T, E, H>>,
    payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> Result<Json<AccessToken>, AppError>
where
    M: MemberRepository + Clone + 'static,
    T: TokenStore + Clone + 'static,
    E: EmailProvider + Clone + 'static,
    H: PasswordHasher + Clone + 'static,
{
    let Json(request) = payload?;
    Ok(Json(service.refresh(&request.refresh_token).await?))
}

/// Revoke a refresh token. Unknown tokens are acknowledged too.
///
/// ```text
/// POST /auth/logout
/// { "refreshToken": "..." }
/// ```
///
/// Responds `204 No Content`.
pub async fn logout<M, T, E, H>(
    State(service): State<AuthService<M, T, E, H>>,
    payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> Result<StatusCode, AppError>
where
    M: MemberRepository + Clone + 'static,
    T: TokenStore + Clone + 'static,
    E: EmailProvider + Clone + 'static,
    H: PasswordHasher + Clone + 'static,
{
    let Json(request) = payload?;
    service.logout(&request.refresh_token).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Report whether an email address is still free.
///
/// ```text
/// POST /auth/check-email
/// { "email": "..." }
/// ```
///
/// ```json
/// { "isUnique": true }
/// ```
pub async fn check_email<M, T, E, H>(
    State(service): State<AuthService<M, T, E, H>>,
    payload: Result<Json<EmailRequest>, JsonRejection>,
) -> Result<Json<CheckEmailResponse>, AppError>
where
    M: MemberRepository + Clone + 'static,
    T: TokenStore + Clone + 'static,
    E: EmailProvider + Clone + 'static,
    H: PasswordHasher + Clone + 'static,
{
    let Json(request) = payload?;
    let is_unique = service.check_email(&request.email).await?;
    Ok(Json(CheckEmailResponse { is_unique }))
}

/// Mail a verification link.
///
/// ```text
/// POST /auth/send-verification-email
/// { "email": "..." }
/// ```
pub async fn send_verification_email<M, T, E, H>(
    State(service): State<AuthService<M, T, E, H>>,
    payload: Result<Json<EmailRequest>, JsonRejection>,
) -> Result<Json<Ack>, AppError>
where
    M: MemberRepository + Clone + 'static,
    T: TokenStore + Clone + 'static,
    E: EmailProvider + Clone + 'static,
    H: PasswordHasher + Clone + 'static,
{
    let Json(request) = payload?;
    service.send_verification_email(&request.email).await?;
    Ok(Json(Ack::new("Verification email sent")))
}

/// Follow a verification link.
///
/// ```text
/// GET /auth/verify-email?token=...
/// ```
///
/// A reused, expired, or unknown token fails with 400 `INVALID_LINK`; a
/// missing `token` parameter with 422 `VALIDATION_ERROR`.
pub async fn verify_email<M, T, E, H>(
    State(service): State<AuthService<M, T, E, H>>,
    query: Result<Query<TokenQuery>, QueryRejection>,
) -> Result<Json<Ack>, AppError>
where
    M: MemberRepository + Clone + 'static,
    T: TokenStore + Clone + 'static,
    E: EmailProvider + Clone + 'static,
    H: PasswordHasher + Clone + 'static,
{
    let Query(query) = query?;
    service.verify_email(&query.token).await?;
    Ok(Json(Ack::new("Email verified")))
}

/// Create a member and pharmacy for a verified email.
///
/// ```text
/// POST /auth/register
/// {
///   "name": "Green Cross Pharmacy",
///   "email": "owner@pharmacy.example",
///   "password": "...",
///   "latitude": 37.5665,
///   "longitude": 126.9780,
///   "address": "1 Main St",
///   "licenseCode": "PH-0001"
/// }
/// ```
///
/// Responds `201 Created`.
pub async fn register<M, T, E, H>(
    State(service): State<AuthService<M, T, E, H>>,
    correlation_id: CorrelationId,
    payload: Result<Json<Registration>, JsonRejection>,
) -> Result<(StatusCode, Json<Ack>), AppError>
where
    M: MemberRepository + Clone + 'static,
    T: TokenStore + Clone + 'static,
    E: EmailProvider + Clone + 'static,
    H: PasswordHasher + Clone + 'static,
{
    let Json(registration) = payload?;
    tracing::debug!(correlation_id = %correlation_id.0, "Registration request");

    service.register(registration).await?;
    Ok((StatusCode::CREATED, Json(Ack::new("Registration complete"))))
}

/// Mail a password reset link.
///
/// ```text
/// POST /auth/forgot-password
/// { "email": "..." }
/// ```
///
/// Acknowledged whether or not the account exists, unless the service is
/// configured to reveal unknown accounts.
pub async fn forgot_password<M, T, E, H>(
    State(service): State<AuthService<M, T, E, H>>,
    payload: Result<Json<EmailRequest>, JsonRejection>,
) -> Result<Json<Ack>, AppError>
where
    M: MemberRepository + Clone + 'static,
    T: TokenStore + Clone + 'static,
    E: EmailProvider + Clone + 'static,
    H: PasswordHasher + Clone + 'static,
{
    let Json(request) = payload?;
    service.send_password_reset(&request.email).await?;
    Ok(Json(Ack::new(
        "If an account exists for this email, a reset link has been sent",
    )))
}

/// Set a new password with a reset token.
///
/// ```text
/// POST /auth/reset-password
/// { "token": "...", "newPassword": "..." }
/// ```
pub async fn reset_password<M, T, E, H>(
    State(service): State<AuthService<M, T, E, H>>,
    payload: Result<Json<ResetPasswordRequest>, JsonRejection>,
) -> Result<Json<Ack>, AppError>
where
    M: MemberRepository + Clone + 'static,
    T: TokenStore + Clone + 'static,
    E: EmailProvider + Clone + 'static,
    H: PasswordHasher + Clone + 'static,
{
    let Json(request) = payload?;
    service
        .reset_password(&request.token, &request.new_password)
        .await?;
    Ok(Json(Ack::new("Password changed")))
}

/// Confirm the caller's password.
///
/// ```text
/// POST /auth/check-password
/// Authorization: Bearer <access token>
/// { "password": "..." }
/// ```
pub async fn check_password<M, T, E, H>(
    State(service): State<AuthService<M, T, E, H>>,
    AuthenticatedMember(claims): AuthenticatedMember,
    payload: Result<Json<PasswordRequest>, JsonRejection>,
) -> Result<Json<Ack>, AppError>
where
    M: MemberRepository + Clone + 'static,
    T: TokenStore + Clone + 'static,
    E: EmailProvider + Clone + 'static,
    H: PasswordHasher + Clone + 'static,
{
    let Json(request) = payload?;
    service
        .check_password(claims.member_id, &request.password)
        .await?;
    Ok(Json(Ack::new("Password confirmed")))
}

/// Deactivate the caller's account.
///
/// ```text
/// POST /auth/delete-account
/// Authorization: Bearer <access token>
/// { "password": "..." }
/// ```
///
/// Responds `204 No Content`. All refresh tokens of the member are revoked.
pub async fn delete_account<M, T, E, H>(
    State(service): State<AuthService<M, T, E, H>>,
    AuthenticatedMember(claims): AuthenticatedMember,
    payload: Result<Json<PasswordRequest>, JsonRejection>,
) -> Result<StatusCode, AppError>
where
    M: MemberRepository + Clone + 'static,
    T: TokenStore + Clone + 'static,
    E: EmailProvider + Clone + 'static,
    H: PasswordHasher + Clone + 'static,
{
    let Json(request) = payload?;
    service
        .deactivate_account(claims.member_id, &request.password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

//! Pharmacy profile of the signed-in member.

use super::{Ack, AuthenticatedMember};
use crate::providers::{EmailProvider, MemberRepository, PasswordHasher, TokenStore};
use crate::service::AuthService;
use crate::state::{PharmacyProfile, PharmacyProfileUpdate};
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use pharmacy_web::AppError;

/// `GET /mypage`
pub async fn get_profile<M, T, E, H>(
    State(service): State<AuthService<M, T, E, H>>,
    AuthenticatedMember(claims): AuthenticatedMember,
) -> Result<Json<PharmacyProfile>, AppError>
where
    M: MemberRepository + Clone + 'static,
    T: TokenStore + Clone + 'static,
    E: EmailProvider + Clone + 'static,
    H: PasswordHasher + Clone + 'static,
{
    Ok(Json(service.profile(claims.member_id).await?))
}

/// `PUT /mypage`
///
/// Replaces the mutable profile fields. The license code cannot be changed.
pub async fn update_profile<M, T, E, H>(
    State(service): State<AuthService<M, T, E, H>>,
    AuthenticatedMember(claims): AuthenticatedMember,
    payload: Result<Json<PharmacyProfileUpdate>, JsonRejection>,
) -> Result<Json<Ack>, AppError>
where
    M: MemberRepository + Clone + 'static,
    T: TokenStore + Clone + 'static,
    E: EmailProvider + Clone + 'static,
    H: PasswordHasher + Clone + 'static,
{
    let Json(update) = payload?;
    service.update_profile(claims.member_id, update).await?;
    Ok(Json(Ack::new("Profile updated")))
}

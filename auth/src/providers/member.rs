//! Credential store trait.

use crate::error::Result;
use crate::state::{
    Member, MemberId, NewMember, NewPharmacy, PharmacyId, PharmacyProfile, PharmacyProfileUpdate,
};
use chrono::{DateTime, Utc};

/// Member and pharmacy records.
///
/// Lookups named `*_active_*` only ever return rows whose soft-delete marker
/// is unset.
///
/// # Implementation Notes
///
/// - `members.email` carries a uniqueness constraint over **all** rows,
///   deactivated ones included
/// - `create_member_with_pharmacy` and `deactivate` touch two tables and
///   MUST be atomic (single transaction)
pub trait MemberRepository: Send + Sync {
    /// Find an active member by email.
    ///
    /// # Errors
    ///
    /// Returns error if the database query fails.
    fn find_active_by_email(
        &self,
        email: &str,
    ) -> impl std::future::Future<Output = Result<Option<Member>>> + Send;

    /// Find an active member by ID.
    ///
    /// # Errors
    ///
    /// Returns error if the database query fails.
    fn find_active_by_id(
        &self,
        member_id: MemberId,
    ) -> impl std::future::Future<Output = Result<Option<Member>>> + Send;

    /// Whether any member row, active or deactivated, uses this email.
    ///
    /// # Errors
    ///
    /// Returns error if the database query fails.
    fn email_exists(&self, email: &str)
    -> impl std::future::Future<Output = Result<bool>> + Send;

    /// Resolve the active pharmacy owned by a member.
    ///
    /// # Errors
    ///
    /// Returns error if the database query fails.
    fn find_pharmacy_id(
        &self,
        member_id: MemberId,
    ) -> impl std::future::Future<Output = Result<Option<PharmacyId>>> + Send;

    /// Insert a member and its pharmacy in one transaction.
    ///
    /// # Errors
    ///
    /// - `EmailAlreadyRegistered` if the email is taken (uniqueness violation)
    /// - `DatabaseError` if either insert fails; nothing is persisted
    fn create_member_with_pharmacy(
        &self,
        member: NewMember,
        pharmacy: NewPharmacy,
    ) -> impl std::future::Future<Output = Result<(MemberId, PharmacyId)>> + Send;

    /// Replace the password hash of an active member.
    ///
    /// Returns `false` if no active member has this ID.
    ///
    /// # Errors
    ///
    /// Returns error if the database update fails.
    fn update_password(
        &self,
        member_id: MemberId,
        password_hash: &str,
    ) -> impl std::future::Future<Output = Result<bool>> + Send;

    /// Soft-delete a member and its pharmacy in one transaction.
    ///
    /// # Errors
    ///
    /// Returns error if the database update fails.
    fn deactivate(
        &self,
        member_id: MemberId,
        at: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Profile of the active member's pharmacy.
    ///
    /// # Errors
    ///
    /// Returns error if the database query fails.
    fn profile(
        &self,
        member_id: MemberId,
    ) -> impl std::future::Future<Output = Result<Option<PharmacyProfile>>> + Send;

    /// Update the active member's pharmacy.
    ///
    /// Returns `false` if there is no active pharmacy for this member.
    ///
    /// # Errors
    ///
    /// Returns error if the database update fails.
    fn update_profile(
        &self,
        member_id: MemberId,
        update: PharmacyProfileUpdate,
    ) -> impl std::future::Future<Output = Result<bool>> + Send;
}

//! Mock member repository for testing.

use crate::error::{AuthError, Result};
use crate::providers::MemberRepository;
use crate::state::{
    Member, MemberId, MemberStatus, NewMember, NewPharmacy, PharmacyId, PharmacyProfile,
    PharmacyProfileUpdate,
};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone)]
struct PharmacyRow {
    id: PharmacyId,
    pharmacy_name: String,
    address: String,
    phone: Option<String>,
    latitude: f64,
    longitude: f64,
    open_time: Option<String>,
    close_time: Option<String>,
    deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
struct Tables {
    members: HashMap<MemberId, Member>,
    /// Keyed by owning member.
    pharmacies: HashMap<MemberId, PharmacyRow>,
    next_member_id: i64,
    next_pharmacy_id: i64,
}

impl Tables {
    fn active_member(&self, member_id: MemberId) -> Option<&Member> {
        self.members
            .get(&member_id)
            .filter(|m| m.status.is_active())
    }

    fn active_pharmacy_mut(&mut self, member_id: MemberId) -> Option<&mut PharmacyRow> {
        if self.active_member(member_id).is_none() {
            return None;
        }
        self.pharmacies
            .get_mut(&member_id)
            .filter(|p| p.deleted_at.is_none())
    }
}

/// Mock member repository.
///
/// In-memory tables with the same guarantees as the PostgreSQL store: email
/// is unique over all rows, and the two-table writes happen under one lock.
#[derive(Debug, Clone, Default)]
pub struct MockMemberRepository {
    tables: Arc<Mutex<Tables>>,
    unavailable: Arc<AtomicBool>,
}

impl MockMemberRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a member with no pharmacy (for integrity-fault tests).
    pub fn insert_orphan_member(&self, email: &str, password_hash: &str) -> MemberId {
        let mut tables = self.lock();
        tables.next_member_id += 1;
        let id = MemberId(tables.next_member_id);
        tables.members.insert(
            id,
            Member {
                id,
                email: email.to_string(),
                password_hash: password_hash.to_string(),
                license_code: String::new(),
                status: MemberStatus::Active,
            },
        );
        id
    }

    /// Any member row with this email, deactivated ones included.
    #[must_use]
    pub fn find_any_by_email(&self, email: &str) -> Option<Member> {
        self.lock()
            .members
            .values()
            .find(|m| m.email == email)
            .cloned()
    }

    /// Soft-delete marker of a member's pharmacy.
    #[must_use]
    pub fn pharmacy_deleted_at(&self, member_id: MemberId) -> Option<DateTime<Utc>> {
        self.lock()
            .pharmacies
            .get(&member_id)
            .and_then(|p| p.deleted_at)
    }

    /// Number of member rows.
    #[must_use]
    pub fn member_count(&self) -> usize {
        self.lock().members.len()
    }

    /// Number of pharmacy rows.
    #[must_use]
    pub fn pharmacy_count(&self) -> usize {
        self.lock().pharmacies.len()
    }

    /// Make every subsequent operation fail with `DatabaseError`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(AuthError::DatabaseError(
                "mock member repository unavailable".to_string(),
            ))
        } else {
            Ok(())
        }
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl MemberRepository for MockMemberRepository {
    async fn find_active_by_email(&self, email: &str) -> Result<Option<Member>> {
        self.check_available()?;
        Ok(self
            .lock()
            .members
            .values()
            .find(|m| m.email == email && m.status.is_active())
            .cloned())
    }

    async fn find_active_by_id(&self, member_id: MemberId) -> Result<Option<Member>> {
        self.check_available()?;
        Ok(self.lock().active_member(member_id).cloned())
    }

    async fn email_exists(&self, email: &str) -> Result<bool> {
        self.check_available()?;
        Ok(self.lock().members.values().any(|m| m.email == email))
    }

    async fn find_pharmacy_id(&self, member_id: MemberId) -> Result<Option<PharmacyId>> {
        self.check_available()?;
        Ok(self
            .lock()
            .active_pharmacy_mut(member_id)
            .map(|p| p.id))
    }

    async fn create_member_with_pharmacy(
        &self,
        member: NewMember,
        pharmacy: NewPharmacy,
    ) -> Result<(MemberId, PharmacyId)> {
        self.check_available()?;
        let mut tables = self.lock();

        if tables.members.values().any(|m| m.email == member.email) {
            return Err(AuthError::EmailAlreadyRegistered);
        }

        tables.next_member_id += 1;
        tables.next_pharmacy_id += 1;
        let member_id = MemberId(tables.next_member_id);
        let pharmacy_id = PharmacyId(tables.next_pharmacy_id);

        tables.members.insert(
            member_id,
            Member {
                id: member_id,
                email: member.email,
                password_hash: member.password_hash,
                license_code: member.license_code,
                status: MemberStatus::Active,
            },
        );
        tables.pharmacies.insert(
            member_id,
            PharmacyRow {
                id: pharmacy_id,
                pharmacy_name: pharmacy.pharmacy_name,
                address: pharmacy.address,
                phone: None,
                latitude: pharmacy.latitude,
                longitude: pharmacy.longitude,
                open_time: None,
                close_time: None,
                deleted_at: None,
            },
        );

        Ok((member_id, pharmacy_id))
    }

    async fn update_password(&self, member_id: MemberId, password_hash: &str) -> Result<bool> {
        self.check_available()?;
        let mut tables = self.lock();
        match tables
            .members
            .get_mut(&member_id)
            .filter(|m| m.status.is_active())
        {
            Some(member) => {
                member.password_hash = password_hash.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn deactivate(&self, member_id: MemberId, at: DateTime<Utc>) -> Result<()> {
        self.check_available()?;
        let mut tables = self.lock();
        if let Some(member) = tables
            .members
            .get_mut(&member_id)
            .filter(|m| m.status.is_active())
        {
            member.status = MemberStatus::Deactivated { at };
        }
        if let Some(pharmacy) = tables
            .pharmacies
            .get_mut(&member_id)
            .filter(|p| p.deleted_at.is_none())
        {
            pharmacy.deleted_at = Some(at);
        }
        Ok(())
    }

    async fn profile(&self, member_id: MemberId) -> Result<Option<PharmacyProfile>> {
        self.check_available()?;
        let mut tables = self.lock();
        let license_code = match tables.active_member(member_id) {
            Some(member) => member.license_code.clone(),
            None => return Ok(None),
        };
        Ok(tables.active_pharmacy_mut(member_id).map(|p| PharmacyProfile {
            pharmacy_name: p.pharmacy_name.clone(),
            license_code,
            address: p.address.clone(),
            phone: p.phone.clone(),
            latitude: p.latitude,
            longitude: p.longitude,
            open_time: p.open_time.clone(),
            close_time: p.close_time.clone(),
        }))
    }

    async fn update_profile(
        &self,
        member_id: MemberId,
        update: PharmacyProfileUpdate,
    ) -> Result<bool> {
        self.check_available()?;
        let mut tables = self.lock();
        let Some(pharmacy) = tables.active_pharmacy_mut(member_id) else {
            return Ok(false);
        };
        pharmacy.pharmacy_name = update.pharmacy_name;
        pharmacy.address = update.address;
        pharmacy.phone = update.phone;
        pharmacy.latitude = update.latitude;
        pharmacy.longitude = update.longitude;
        pharmacy.open_time = update.open_time;
        pharmacy.close_time = update.close_time;
        Ok(true)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;

    fn new_member(email: &str) -> (NewMember, NewPharmacy) {
        (
            NewMember {
                email: email.to_string(),
                password_hash: "hash".to_string(),
                license_code: "L-1".to_string(),
            },
            NewPharmacy {
                pharmacy_name: "Corner".to_string(),
                address: "1 Main St".to_string(),
                latitude: 37.5,
                longitude: 127.0,
            },
        )
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let repo = MockMemberRepository::new();
        let (m, p) = new_member("a@x.com");
        let (member_id, pharmacy_id) = repo.create_member_with_pharmacy(m, p).await.unwrap();

        let member = repo.find_active_by_email("a@x.com").await.unwrap().unwrap();
        assert_eq!(member.id, member_id);
        assert_eq!(repo.find_pharmacy_id(member_id).await.unwrap(), Some(pharmacy_id));
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let repo = MockMemberRepository::new();
        let (m, p) = new_member("a@x.com");
        repo.create_member_with_pharmacy(m.clone(), p.clone()).await.unwrap();

        let result = repo.create_member_with_pharmacy(m, p).await;
        assert_eq!(result, Err(AuthError::EmailAlreadyRegistered));
        assert_eq!(repo.member_count(), 1);
        assert_eq!(repo.pharmacy_count(), 1);
    }

    #[tokio::test]
    async fn test_deactivate_hides_member_but_keeps_email_taken() {
        let repo = MockMemberRepository::new();
        let (m, p) = new_member("a@x.com");
        let (member_id, _) = repo.create_member_with_pharmacy(m, p).await.unwrap();

        repo.deactivate(member_id, Utc::now()).await.unwrap();

        assert!(repo.find_active_by_email("a@x.com").await.unwrap().is_none());
        assert!(repo.find_active_by_id(member_id).await.unwrap().is_none());
        assert!(repo.find_pharmacy_id(member_id).await.unwrap().is_none());
        assert!(repo.email_exists("a@x.com").await.unwrap());
        assert!(repo.pharmacy_deleted_at(member_id).is_some());
        assert!(!repo.update_password(member_id, "new").await.unwrap());
    }

    #[tokio::test]
    async fn test_profile_update() {
        let repo = MockMemberRepository::new();
        let (m, p) = new_member("a@x.com");
        let (member_id, _) = repo.create_member_with_pharmacy(m, p).await.unwrap();

        let updated = repo
            .update_profile(
                member_id,
                PharmacyProfileUpdate {
                    pharmacy_name: "Renamed".to_string(),
                    address: "2 Side St".to_string(),
                    phone: Some("02-123-4567".to_string()),
                    latitude: 1.0,
                    longitude: 2.0,
                    open_time: Some("09:00".to_string()),
                    close_time: Some("18:00".to_string()),
                },
            )
            .await
            .unwrap();
        assert!(updated);

        let profile = repo.profile(member_id).await.unwrap().unwrap();
        assert_eq!(profile.pharmacy_name, "Renamed");
        assert_eq!(profile.license_code, "L-1");
        assert_eq!(profile.open_time.as_deref(), Some("09:00"));
    }
}

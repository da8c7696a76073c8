//! Domain types for members, pharmacies, and issued credentials.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ═══════════════════════════════════════════════════════════════════════
// ID Types
// ═══════════════════════════════════════════════════════════════════════

/// Database identifier of a member account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(pub i64);

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Database identifier of a pharmacy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PharmacyId(pub i64);

impl fmt::Display for PharmacyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Credential Store Records
// ═══════════════════════════════════════════════════════════════════════

/// Lifecycle status of a member account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberStatus {
    /// Account is usable.
    Active,
    /// Account was soft-deleted at the given instant.
    Deactivated {
        /// When the account was deactivated.
        at: DateTime<Utc>,
    },
}

impl MemberStatus {
    /// Build a status from a nullable soft-delete timestamp.
    #[must_use]
    pub const fn from_deleted_at(deleted_at: Option<DateTime<Utc>>) -> Self {
        match deleted_at {
            None => Self::Active,
            Some(at) => Self::Deactivated { at },
        }
    }

    /// Returns `true` for [`MemberStatus::Active`].
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

/// A member account as held by the credential store.
#[derive(Clone, PartialEq)]
pub struct Member {
    /// Member ID.
    pub id: MemberId,
    /// Unique email address.
    pub email: String,
    /// bcrypt digest of the password.
    pub password_hash: String,
    /// Pharmacist license code.
    pub license_code: String,
    /// Active or deactivated.
    pub status: MemberStatus,
}

impl fmt::Debug for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Member")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("license_code", &self.license_code)
            .field("status", &self.status)
            .finish()
    }
}

/// Member fields written at registration.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMember {
    /// Email address (must be unique across all rows).
    pub email: String,
    /// bcrypt digest of the password.
    pub password_hash: String,
    /// Pharmacist license code.
    pub license_code: String,
}

/// Pharmacy fields written at registration.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPharmacy {
    /// Display name.
    pub pharmacy_name: String,
    /// Street address.
    pub address: String,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

/// Pharmacy profile as shown on the member's own page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PharmacyProfile {
    /// Display name.
    pub pharmacy_name: String,
    /// License code of the owning member.
    pub license_code: String,
    /// Street address.
    pub address: String,
    /// Contact phone number.
    pub phone: Option<String>,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Opening time, e.g. "09:00".
    pub open_time: Option<String>,
    /// Closing time, e.g. "18:00".
    pub close_time: Option<String>,
}

/// Mutable pharmacy fields. The license code is fixed at registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PharmacyProfileUpdate {
    /// Display name.
    pub pharmacy_name: String,
    /// Street address.
    pub address: String,
    /// Contact phone number.
    #[serde(default)]
    pub phone: Option<String>,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Opening time.
    #[serde(default)]
    pub open_time: Option<String>,
    /// Closing time.
    #[serde(default)]
    pub close_time: Option<String>,
}

// ═══════════════════════════════════════════════════════════════════════
// Flow Inputs / Outputs
// ═══════════════════════════════════════════════════════════════════════

/// Registration input.
#[derive(Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    /// Pharmacy display name.
    pub name: String,
    /// Email address, previously confirmed through the verification flow.
    pub email: String,
    /// Plaintext password.
    pub password: String,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Street address.
    pub address: String,
    /// Pharmacist license code.
    pub license_code: String,
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("address", &self.address)
            .field("license_code", &self.license_code)
            .finish_non_exhaustive()
    }
}

/// Tokens returned by a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    /// Signed access token.
    pub access_token: String,
    /// Opaque refresh token.
    pub refresh_token: String,
}

/// Access token returned by a refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessToken {
    /// Signed access token.
    pub access_token: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;

    #[test]
    fn test_status_from_deleted_at() {
        assert!(MemberStatus::from_deleted_at(None).is_active());
        let at = Utc::now();
        assert_eq!(
            MemberStatus::from_deleted_at(Some(at)),
            MemberStatus::Deactivated { at }
        );
    }

    #[test]
    fn test_member_debug_hides_hash() {
        let member = Member {
            id: MemberId(1),
            email: "a@x.com".to_string(),
            password_hash: "$2b$10$secret".to_string(),
            license_code: "L-1".to_string(),
            status: MemberStatus::Active,
        };
        assert!(!format!("{member:?}").contains("secret"));
    }

    #[test]
    fn test_registration_deserializes_camel_case() {
        let json = r#"{
            "name": "Corner Pharmacy",
            "email": "a@x.com",
            "password": "pw",
            "latitude": 37.5,
            "longitude": 127.0,
            "address": "1 Main St",
            "licenseCode": "L-42"
        }"#;
        let reg: Registration = serde_json::from_str(json).unwrap();
        assert_eq!(reg.license_code, "L-42");
        assert!(!format!("{reg:?}").contains("\"pw\""));
    }

    #[test]
    fn test_token_pair_serializes_camel_case() {
        let pair = TokenPair {
            access_token: "a".to_string(),
            refresh_token: "r".to_string(),
        };
        let value = serde_json::to_value(&pair).unwrap();
        assert_eq!(value["accessToken"], "a");
        assert_eq!(value["refreshToken"], "r");
    }
}

//! # Pharmacy Authentication
//!
//! Identity and credential lifecycle for pharmacy members: registration
//! gated on email verification, password login with short-lived signed
//! access tokens and revocable refresh tokens, password reset, account
//! deactivation, and the member's pharmacy profile.
//!
//! ## Architecture
//!
//! ```text
//!   HTTP (feature "axum")          handlers + router
//!            │
//!            ▼
//!   AuthService ──► AuthEnvironment { members, tokens, email, hasher, clock }
//!            │
//!            └──► AccessTokenIssuer (HS256, stateless)
//! ```
//!
//! - Durable records (members, pharmacies) live behind [`providers::MemberRepository`]
//! - Every TTL-bound record (refresh, verification, reset) lives in the
//!   [`providers::TokenStore`], which enforces expiry itself
//! - Soft-deleted members are invisible to every flow
//!
//! ## Example
//!
//! ```rust
//! use pharmacy_auth::mocks::{ManualClock, MockEmailProvider, MockMemberRepository, MockTokenStore};
//! use pharmacy_auth::providers::BcryptPasswordHasher;
//! use pharmacy_auth::{AuthConfig, AuthEnvironment, AuthService};
//! use std::sync::Arc;
//!
//! # async fn example() -> pharmacy_auth::Result<()> {
//! let clock = Arc::new(ManualClock::new());
//! let env = AuthEnvironment::new(
//!     MockMemberRepository::new(),
//!     MockTokenStore::with_clock(clock.clone()),
//!     MockEmailProvider::new(),
//!     BcryptPasswordHasher::new(4),
//!     clock,
//! );
//! let service = AuthService::new(env, AuthConfig::default());
//!
//! assert!(service.check_email("owner@pharmacy.example").await?);
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

// Public modules
pub mod config;
pub mod constants;
pub mod environment;
pub mod error;
pub mod providers;
pub mod service;
pub mod state;
pub mod stores;
pub mod tokens;
pub mod utils;

// Mock implementations
#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

// HTTP layer
#[cfg(feature = "axum")]
pub mod handlers;
#[cfg(feature = "axum")]
pub mod router;

// Re-export main types for convenience
pub use config::AuthConfig;
pub use environment::AuthEnvironment;
pub use error::{AuthError, ErrorKind, Result};
pub use service::AuthService;
pub use state::{
    AccessToken, Member, MemberId, MemberStatus, PharmacyId, PharmacyProfile,
    PharmacyProfileUpdate, Registration, TokenPair,
};
pub use tokens::{AccessClaims, AccessTokenIssuer};

#[cfg(feature = "axum")]
pub use router::auth_router;

//! Mock provider implementations for testing.
//!
//! Simple, in-memory implementations of all provider traits for use in unit
//! and integration tests.

pub mod clock;
pub mod email;
pub mod member;
pub mod token_store;

pub use clock::ManualClock;
pub use email::MockEmailProvider;
pub use member::MockMemberRepository;
pub use token_store::MockTokenStore;

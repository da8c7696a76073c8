//! PostgreSQL storage implementations.
//!
//! Persistent member and pharmacy records. Schema lives in `auth/migrations`.

pub mod member;

pub use member::PostgresMemberRepository;

//! Authentication providers.
//!
//! Traits for every external dependency of the credential lifecycle, plus the
//! production implementations that need no infrastructure of their own.
//!
//! # Architecture
//!
//! Providers are **interfaces**. [`crate::service::AuthService`] depends on
//! these traits and the application wires in concrete implementations:
//!
//! ```text
//!                 ┌──────────────────┐
//!                 │   AuthService    │
//!                 └────────┬─────────┘
//!      ┌──────────┬────────┼──────────┬──────────────┐
//!      ▼          ▼        ▼          ▼              ▼
//! MemberRepo  TokenStore  Email   PasswordHasher   Clock
//! (Postgres)  (Redis)     (SMTP)  (bcrypt)         (system)
//! ```
//!
//! This enables:
//! - **Testing**: in-memory mocks with a manual clock
//! - **Production**: PostgreSQL, Redis, an SMTP relay
//! - **Development**: console mail output

pub mod clock;
pub mod console_email;
pub mod email;
pub mod member;
pub mod password;
pub mod smtp_email;
pub mod templates;
pub mod token_store;

pub use clock::{Clock, SystemClock};
pub use console_email::ConsoleEmailProvider;
pub use email::{EmailProvider, OutgoingEmail};
pub use member::MemberRepository;
pub use password::{BcryptPasswordHasher, PasswordHasher};
pub use smtp_email::SmtpEmailProvider;
pub use token_store::{TokenKey, TokenStore};

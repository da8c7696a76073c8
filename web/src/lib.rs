//! HTTP plumbing shared by the pharmacy backend services.
//!
//! Domain crates own their routes and handlers; this crate supplies the
//! pieces every router needs:
//!
//! - [`AppError`]: JSON error responses with a stable `code`
//! - Extractors: [`CorrelationId`], [`BearerToken`]
//! - Middleware: correlation IDs and request tracing
//! - [`handlers::health_check`]
//!
//! # Example
//!
//! ```ignore
//! use pharmacy_web::{AppError, middleware::correlation_id_layers};
//! use axum::{Router, routing::get};
//!
//! let app = Router::new()
//!     .route("/health", get(pharmacy_web::handlers::health_check))
//!     .merge(domain_routes)
//!     .layer(correlation_id_layers());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;

// Re-export key types for convenience
pub use error::AppError;
pub use extractors::{BearerToken, CorrelationId};
pub use middleware::{CORRELATION_ID_HEADER, correlation_id_layers};

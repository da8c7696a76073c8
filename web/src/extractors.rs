//! Custom Axum extractors.
//!
//! - `CorrelationId`: the request's correlation ID (set by the middleware, or generated)
//! - `BearerToken`: raw token from `Authorization: Bearer ...`
//!
//! # Examples
//!
//! ```ignore
//! async fn handler(
//!     correlation_id: CorrelationId,
//!     BearerToken(token): BearerToken,
//! ) -> Result<Json<Response>, AppError> {
//!     tracing::info!(correlation_id = %correlation_id.0, "Processing request");
//!     Ok(Json(response))
//! }
//! ```

use crate::error::AppError;
use crate::middleware::CORRELATION_ID_HEADER;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use tower_http::request_id::RequestId;
use uuid::Uuid;

/// Correlation ID for request tracing.
///
/// Reads the ID assigned by [`crate::middleware::correlation_id_layers`];
/// without the middleware it falls back to the `X-Correlation-ID` header and
/// finally to a fresh UUID v4.
#[derive(Debug, Clone, Copy)]
pub struct CorrelationId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for CorrelationId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let from_layer = parts
            .extensions
            .get::<RequestId>()
            .and_then(|id| id.header_value().to_str().ok())
            .and_then(|s| Uuid::parse_str(s).ok());

        let correlation_id = from_layer
            .or_else(|| {
                parts
                    .headers
                    .get(CORRELATION_ID_HEADER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| Uuid::parse_str(s).ok())
            })
            .unwrap_or_else(Uuid::new_v4);

        Ok(Self(correlation_id))
    }
}

/// Raw bearer token from the `Authorization` header.
///
/// Rejects with 401 `MISSING_TOKEN` when the header is absent or not a
/// bearer credential. The token itself is not verified here.
#[derive(Clone)]
pub struct BearerToken(pub String);

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BearerToken(<redacted>)")
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| {
                s.strip_prefix("Bearer ")
                    .or_else(|| s.strip_prefix("bearer "))
            })
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(|token| Self(token.to_string()))
            .ok_or_else(|| {
                AppError::unauthorized("Missing bearer token").with_code("MISSING_TOKEN")
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;
    use axum::http::{HeaderValue, Request};

    fn parts_with(headers: &[(&'static str, &'static str)]) -> Parts {
        let mut builder = Request::builder().uri("/");
        for (name, value) in headers {
            builder = builder.header(*name, HeaderValue::from_static(value));
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn test_bearer_token() {
        let mut parts = parts_with(&[("authorization", "Bearer abc.def.ghi")]);
        let token = BearerToken::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(token.0, "abc.def.ghi");
    }

    #[tokio::test]
    async fn test_bearer_token_missing_or_wrong_scheme() {
        let mut parts = parts_with(&[]);
        let err = BearerToken::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert_eq!(err.code(), "MISSING_TOKEN");

        let mut parts = parts_with(&[("authorization", "Basic dXNlcjpwYXNz")]);
        assert!(BearerToken::from_request_parts(&mut parts, &()).await.is_err());
    }

    #[tokio::test]
    async fn test_correlation_id_from_header() {
        let id = "6f1c1c7e-0b7a-4d4e-9f0e-6b1d2c3a4b5c";
        let mut parts = parts_with(&[("x-correlation-id", id)]);
        let CorrelationId(found) = CorrelationId::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(found.to_string(), id);
    }
}

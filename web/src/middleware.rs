//! Request tracking middleware.
//!
//! Every request gets a correlation ID: taken from an incoming
//! `X-Correlation-ID` header when it is a valid UUID, generated otherwise.
//! The ID is stored in request extensions (as `tower_http::request_id::RequestId`),
//! recorded on the request's tracing span, and echoed in the response header.
//!
//! # Example
//!
//! ```ignore
//! use pharmacy_web::middleware::correlation_id_layers;
//!
//! let app = Router::new()
//!     .route("/auth/login", post(login))
//!     .layer(correlation_id_layers());
//! ```

use axum::http::{HeaderName, HeaderValue, Request};
use tower::ServiceBuilder;
use tower::layer::util::{Identity, Stack};
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::{MakeSpan, TraceLayer};
use uuid::Uuid;

/// Header name for correlation ID.
pub const CORRELATION_ID_HEADER: &str = "X-Correlation-ID";

fn header_name() -> HeaderName {
    HeaderName::from_static("x-correlation-id")
}

/// Keeps a valid incoming UUID, replaces anything else with a fresh one.
#[derive(Clone, Copy, Debug, Default)]
pub struct MakeCorrelationId;

impl MakeRequestId for MakeCorrelationId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Drops incoming correlation IDs that are not UUIDs so the generator runs.
fn sanitize_incoming<B>(mut request: Request<B>) -> Request<B> {
    let valid = request
        .headers()
        .get(CORRELATION_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|s| Uuid::parse_str(s).is_ok());
    if !valid {
        request.headers_mut().remove(CORRELATION_ID_HEADER);
    }
    request
}

/// Tracing span carrying the correlation ID.
#[derive(Clone, Copy, Debug, Default)]
pub struct CorrelationSpan;

impl<B> MakeSpan<B> for CorrelationSpan {
    fn make_span(&mut self, request: &Request<B>) -> tracing::Span {
        let correlation_id = request
            .extensions()
            .get::<RequestId>()
            .and_then(|id| id.header_value().to_str().ok())
            .unwrap_or("-");

        tracing::info_span!(
            "http_request",
            correlation_id = %correlation_id,
            method = %request.method(),
            uri = %request.uri(),
        )
    }
}

/// Layer stack returned by [`correlation_id_layers`].
pub type CorrelationLayers = ServiceBuilder<
    Stack<
        PropagateRequestIdLayer,
        Stack<
            TraceLayer<SharedClassifier<ServerErrorsAsFailures>, CorrelationSpan>,
            Stack<
                SetRequestIdLayer<MakeCorrelationId>,
                Stack<tower::util::MapRequestLayer<fn(Request<axum::body::Body>) -> Request<axum::body::Body>>, Identity>,
            >,
        >,
    >,
>;

/// Correlation ID assignment, request tracing, and response propagation.
#[must_use]
pub fn correlation_id_layers() -> CorrelationLayers {
    let sanitize: fn(Request<axum::body::Body>) -> Request<axum::body::Body> = sanitize_incoming;

    ServiceBuilder::new()
        .map_request(sanitize)
        .layer(SetRequestIdLayer::new(header_name(), MakeCorrelationId))
        .layer(TraceLayer::new_for_http().make_span_with(CorrelationSpan))
        .layer(PropagateRequestIdLayer::new(header_name()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code
mod tests {
    use super::*;
    use crate::extractors::CorrelationId;
    use axum::{Router, body::Body, routing::get};
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new()
            .route("/test", get(|CorrelationId(id): CorrelationId| async move { id.to_string() }))
            .layer(correlation_id_layers())
    }

    #[tokio::test]
    async fn test_correlation_id_generated_if_missing() {
        let request = Request::builder().uri("/test").body(Body::empty()).unwrap();
        let response = app().oneshot(request).await.unwrap();

        let correlation_id = response
            .headers()
            .get(CORRELATION_ID_HEADER)
            .expect("Correlation ID header should be present");
        assert!(Uuid::parse_str(correlation_id.to_str().unwrap()).is_ok());
    }

    #[tokio::test]
    async fn test_correlation_id_preserved_and_visible_to_handler() {
        use http_body_util::BodyExt;

        let request_uuid = Uuid::new_v4();
        let request = Request::builder()
            .uri("/test")
            .header(CORRELATION_ID_HEADER, request_uuid.to_string())
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        let header = response
            .headers()
            .get(CORRELATION_ID_HEADER)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert_eq!(header, request_uuid.to_string());

        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(body, request_uuid.to_string().as_bytes());
    }

    #[tokio::test]
    async fn test_invalid_uuid_generates_new() {
        let request = Request::builder()
            .uri("/test")
            .header(CORRELATION_ID_HEADER, "not-a-uuid")
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        let uuid_str = response
            .headers()
            .get(CORRELATION_ID_HEADER)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(Uuid::parse_str(uuid_str).is_ok());
        assert_ne!(uuid_str, "not-a-uuid");
    }
}

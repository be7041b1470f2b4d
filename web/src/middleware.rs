//! Axum middleware for request-ID resolution and request tracking.
//!
//! Every request passes through a small per-request state machine:
//!
//! 1. Read the `X-Request-ID` header. Absent → generate a fresh ID and
//!    skip the validation and dedup steps.
//! 2. Present → validate length and alphabet. Invalid → regenerate.
//! 3. Valid → check the dedup ledger. A ledger failure is logged and
//!    treated as not-duplicate (availability over strict dedup).
//!    Duplicate → regenerate.
//! 4. Replacements are logged at WARN with the original ID, the new ID,
//!    and the reason.
//! 5. The resolved ID is recorded in the ledger with a fixed TTL;
//!    write failures are logged, never fatal.
//! 6. The resolved ID rides in request extensions; handlers read it
//!    through [`RequestIdExt`], never the raw extension type.
//!
//! On completion the middleware emits exactly one structured log line
//! with method, path, status, human-formatted duration, and the first
//! eight characters of the resolved ID. Severity escalates with status:
//! 5xx → error, 4xx → warn, otherwise info.
//!
//! # Example
//!
//! ```ignore
//! use axum::Router;
//! use studia_web::middleware::RequestIdLayer;
//!
//! let app = Router::new()
//!     .route("/api/v1/users/ping", get(ping))
//!     .layer(RequestIdLayer::new(cache));
//! ```

use axum::{extract::Request, http::HeaderValue, response::Response};
use std::task::{Context, Poll};
use std::time::{Duration, Instant};
use studia_identity::request_id::{self, Provenance, REQUEST_ID_HEADER};
use studia_identity::{CacheStore, RequestIdConfig};
use tower::{Layer, Service};
use tracing::warn;

/// Request ID resolved by the middleware, as seen by handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRequestId {
    /// The full resolved token.
    pub id: String,
    /// Whether the client's value was accepted or replaced.
    pub provenance: Provenance,
}

impl ResolvedRequestId {
    /// First eight characters of the token, for compact log output.
    #[must_use]
    pub fn short(&self) -> &str {
        self.id.get(..8).unwrap_or(&self.id)
    }
}

/// Error detail a handler attaches to its response for the completion
/// log line.
#[derive(Debug, Clone)]
pub struct HandlerError(pub String);

/// Layer that resolves, dedups, and propagates request IDs.
#[derive(Clone, Debug)]
pub struct RequestIdLayer<C> {
    cache: C,
    config: RequestIdConfig,
}

impl<C> RequestIdLayer<C> {
    /// Create a layer backed by the given dedup ledger, with the
    /// default one-hour window.
    pub fn new(cache: C) -> Self {
        Self {
            cache,
            config: RequestIdConfig::default(),
        }
    }

    /// Override the dedup configuration.
    #[must_use]
    pub fn with_config(mut self, config: RequestIdConfig) -> Self {
        self.config = config;
        self
    }
}

impl<S, C: Clone> Layer<S> for RequestIdLayer<C> {
    type Service = RequestIdMiddleware<S, C>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestIdMiddleware {
            inner,
            cache: self.cache.clone(),
            config: self.config.clone(),
        }
    }
}

/// Middleware service produced by [`RequestIdLayer`].
#[derive(Clone, Debug)]
pub struct RequestIdMiddleware<S, C> {
    inner: S,
    cache: C,
    config: RequestIdConfig,
}

impl<S, C> Service<Request> for RequestIdMiddleware<S, C>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
    C: CacheStore + Clone + Send + Sync + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        // The clone is the fresh (unpolled) service; swap so the one we
        // drive into the future is the one poll_ready readied.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let cache = self.cache.clone();
        let dedup_ttl = self.config.dedup_ttl;

        Box::pin(async move {
            let started = Instant::now();
            let method = req.method().clone();
            let path = req.uri().path().to_string();

            let supplied = req
                .headers()
                .get(REQUEST_ID_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(ToString::to_string);

            let resolved = resolve_request_id(&cache, supplied.as_deref(), dedup_ttl).await;
            req.extensions_mut().insert(resolved.clone());

            let mut response = inner.call(req).await?;

            if let Ok(header_value) = HeaderValue::from_str(&resolved.id) {
                response
                    .headers_mut()
                    .insert(REQUEST_ID_HEADER, header_value);
            }

            let status = response.status().as_u16();
            let duration = format_duration(started.elapsed());
            let handler_error = response
                .extensions()
                .get::<HandlerError>()
                .map(|e| e.0.clone());

            log_completion(
                status,
                method.as_str(),
                &path,
                &duration,
                resolved.short(),
                handler_error.as_deref(),
            );

            Ok(response)
        })
    }
}

/// Run the ID-resolution state machine against an optional header value.
async fn resolve_request_id<C: CacheStore>(
    cache: &C,
    supplied: Option<&str>,
    dedup_ttl: chrono::Duration,
) -> ResolvedRequestId {
    let Some(candidate) = supplied else {
        // No client value: nothing to validate or dedup.
        return ResolvedRequestId {
            id: request_id::generate(),
            provenance: Provenance::ServerGenerated,
        };
    };

    let replacement = match request_id::validate(candidate) {
        Err(invalid) => Some(("invalid_format", invalid.to_string())),
        Ok(()) => {
            match request_id::is_duplicate(cache, candidate).await {
                Ok(true) => Some(("duplicate_request_id", String::new())),
                Ok(false) => None,
                Err(e) => {
                    // Soft guarantee: a ledger outage never blocks the
                    // request, it only forfeits dedup.
                    warn!(error = %e, "request ID dedup check failed, proceeding without dedup");
                    None
                }
            }
        }
    };

    let resolved = match replacement {
        Some((reason, detail)) => {
            let replacement = request_id::generate();
            warn!(
                original = %candidate,
                replacement = %replacement,
                reason,
                detail = %detail,
                "replaced client request ID"
            );
            ResolvedRequestId {
                id: replacement,
                provenance: Provenance::ServerGenerated,
            }
        }
        None => ResolvedRequestId {
            id: candidate.to_string(),
            provenance: Provenance::ClientSupplied,
        },
    };

    if let Err(e) = request_id::store_with_ttl(cache, &resolved.id, dedup_ttl).await {
        warn!(error = %e, "failed to record request ID in dedup ledger");
    }

    resolved
}

/// Render an elapsed duration at a precision matching its magnitude.
fn format_duration(elapsed: Duration) -> String {
    let micros = elapsed.as_micros();
    if micros < 1_000 {
        format!("{micros}\u{b5}s")
    } else if micros < 1_000_000 {
        #[allow(clippy::cast_precision_loss)]
        let millis = micros as f64 / 1_000.0;
        format!("{millis:.1}ms")
    } else {
        format!("{:.2}s", elapsed.as_secs_f64())
    }
}

/// One completion line per request, severity keyed to the status class.
fn log_completion(
    status: u16,
    method: &str,
    path: &str,
    duration: &str,
    request_id: &str,
    error: Option<&str>,
) {
    match (status, error) {
        (500.., Some(err)) => tracing::error!(
            method, path, status, duration, request_id, error = err, "request completed"
        ),
        (500.., None) => {
            tracing::error!(method, path, status, duration, request_id, "request completed");
        }
        (400.., Some(err)) => tracing::warn!(
            method, path, status, duration, request_id, error = err, "request completed"
        ),
        (400.., None) => {
            tracing::warn!(method, path, status, duration, request_id, "request completed");
        }
        (_, Some(err)) => tracing::info!(
            method, path, status, duration, request_id, error = err, "request completed"
        ),
        (_, None) => {
            tracing::info!(method, path, status, duration, request_id, "request completed");
        }
    }
}

/// Accessor for the request ID resolved by the middleware.
///
/// Handlers read the ID through this trait rather than the raw
/// extension type, so the storage key stays private to this module's
/// conventions.
pub trait RequestIdExt {
    /// The resolved request ID, if the middleware is installed.
    fn request_id(&self) -> Option<&ResolvedRequestId>;
}

impl RequestIdExt for Request {
    fn request_id(&self) -> Option<&ResolvedRequestId> {
        self.extensions().get::<ResolvedRequestId>()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, routing::get, Router};
    use studia_identity::mocks::InMemoryCacheStore;
    use tower::ServiceExt;

    fn app(cache: InMemoryCacheStore) -> Router {
        Router::new()
            .route("/test", get(|| async { "ok" }))
            .layer(RequestIdLayer::new(cache))
    }

    async fn response_id(app: Router, request: Request<Body>) -> String {
        let response = app.oneshot(request).await.unwrap();
        response
            .headers()
            .get(REQUEST_ID_HEADER)
            .expect("request ID header should be present")
            .to_str()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn missing_header_gets_generated_id() {
        let request = Request::builder().uri("/test").body(Body::empty()).unwrap();
        let id = response_id(app(InMemoryCacheStore::new()), request).await;

        assert_eq!(id.len(), 40);
        assert!(request_id::validate(&id).is_ok());
    }

    #[tokio::test]
    async fn fresh_valid_client_id_is_preserved() {
        let client_id = "abcdef0123456789abcdef0123456789";
        let request = Request::builder()
            .uri("/test")
            .header(REQUEST_ID_HEADER, client_id)
            .body(Body::empty())
            .unwrap();

        let id = response_id(app(InMemoryCacheStore::new()), request).await;
        assert_eq!(id, client_id);
    }

    #[tokio::test]
    async fn malformed_client_id_is_replaced() {
        let request = Request::builder()
            .uri("/test")
            .header(REQUEST_ID_HEADER, "NOT-HEX!")
            .body(Body::empty())
            .unwrap();

        let id = response_id(app(InMemoryCacheStore::new()), request).await;
        assert_ne!(id, "NOT-HEX!");
        assert!(request_id::validate(&id).is_ok());
    }

    #[tokio::test]
    async fn duplicate_client_id_is_replaced() {
        let cache = InMemoryCacheStore::new();
        let client_id = "abcdef0123456789abcdef0123456789";
        request_id::store(&cache, client_id).await.unwrap();

        let request = Request::builder()
            .uri("/test")
            .header(REQUEST_ID_HEADER, client_id)
            .body(Body::empty())
            .unwrap();

        let id = response_id(app(cache), request).await;
        assert_ne!(id, client_id);
        assert!(request_id::validate(&id).is_ok());
    }

    #[tokio::test]
    async fn replayed_request_gets_a_new_id_second_time() {
        let cache = InMemoryCacheStore::new();
        let client_id = "abcdef0123456789abcdef0123456789";

        let first = Request::builder()
            .uri("/test")
            .header(REQUEST_ID_HEADER, client_id)
            .body(Body::empty())
            .unwrap();
        let first_id = response_id(app(cache.clone()), first).await;
        assert_eq!(first_id, client_id);

        let second = Request::builder()
            .uri("/test")
            .header(REQUEST_ID_HEADER, client_id)
            .body(Body::empty())
            .unwrap();
        let second_id = response_id(app(cache), second).await;
        assert_ne!(second_id, client_id);
    }

    #[tokio::test]
    async fn ledger_outage_does_not_block_the_request() {
        let cache = InMemoryCacheStore::new();
        cache.fail_next_ops();

        let client_id = "abcdef0123456789abcdef0123456789";
        let request = Request::builder()
            .uri("/test")
            .header(REQUEST_ID_HEADER, client_id)
            .body(Body::empty())
            .unwrap();

        let response = app(cache).oneshot(request).await.unwrap();
        assert_eq!(response.status(), 200);
        // Dedup is forfeited, the client ID survives.
        assert_eq!(
            response
                .headers()
                .get(REQUEST_ID_HEADER)
                .unwrap()
                .to_str()
                .unwrap(),
            client_id
        );
    }

    #[tokio::test]
    async fn handlers_see_the_resolved_id_via_accessor() {
        async fn handler(req: Request<Body>) -> String {
            let resolved = req.request_id().expect("middleware installed");
            assert_eq!(resolved.provenance, Provenance::ClientSupplied);
            resolved.id.clone()
        }

        let cache = InMemoryCacheStore::new();
        let client_id = "abcdef0123456789abcdef0123456789";
        let app = Router::new()
            .route("/test", get(handler))
            .layer(RequestIdLayer::new(cache));

        let request = Request::builder()
            .uri("/test")
            .header(REQUEST_ID_HEADER, client_id)
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), 200);
    }

    #[test]
    fn durations_format_by_magnitude() {
        assert_eq!(format_duration(Duration::from_micros(250)), "250\u{b5}s");
        assert_eq!(format_duration(Duration::from_micros(1_500)), "1.5ms");
        assert_eq!(format_duration(Duration::from_millis(2_500)), "2.50s");
    }

    #[test]
    fn short_form_is_first_eight_chars() {
        let resolved = ResolvedRequestId {
            id: "abcdef0123456789".to_string(),
            provenance: Provenance::ClientSupplied,
        };
        assert_eq!(resolved.short(), "abcdef01");

        let tiny = ResolvedRequestId {
            id: "abc".to_string(),
            provenance: Provenance::ServerGenerated,
        };
        assert_eq!(tiny.short(), "abc");
    }
}

//! Router assembly.

use crate::handlers;
use crate::middleware::RequestIdLayer;
use crate::state::AppState;
use axum::routing::{get, post};
use axum::Router;
use studia_identity::{CacheStore, MailSender, UserRepository};
use tower_http::cors::CorsLayer;

/// Build the full API router.
///
/// The request-ID layer wraps everything, so even unmatched routes get
/// a resolved ID and a completion log line. The cache handed here backs
/// the dedup ledger; it is usually the same store the workflow uses for
/// OTP challenges.
pub fn router<R, C, M>(state: AppState<R, C, M>, cache: C) -> Router
where
    R: UserRepository + Send + Sync + 'static,
    C: CacheStore + Clone + Send + Sync + 'static,
    M: MailSender + Send + Sync + 'static,
{
    Router::new()
        .route("/api/v1/users/", post(handlers::create_user::<R, C, M>))
        .route(
            "/api/v1/users/verify-email",
            post(handlers::verify_email::<R, C, M>),
        )
        .route("/api/v1/users/ping", get(handlers::ping))
        .with_state(state)
        .layer(RequestIdLayer::new(cache))
        .layer(CorsLayer::permissive())
}

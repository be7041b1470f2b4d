//! # Studia Web
//!
//! Axum HTTP surface for the Studia backend: user registration, email
//! verification, and the request-ID correlation layer.
//!
//! ## Conventions
//!
//! - Transport status is always 200; the envelope's `code` field
//!   carries the application outcome
//! - Every request resolves exactly one `X-Request-ID`, validated and
//!   dedup-checked against the cache, echoed on the response
//! - One structured completion log line per request
//!
//! ## Example
//!
//! ```rust,ignore
//! use studia_identity::{OtpConfig, UserService};
//! use studia_identity::stores::RedisCacheStore;
//! use studia_web::{router, AppState};
//!
//! let cache = RedisCacheStore::new("redis://127.0.0.1:6379").await?;
//! let service = UserService::new(users, cache.clone(), mail, OtpConfig::default());
//! let app = router(AppState::new(service), cache);
//! axum::serve(listener, app).await?;
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use middleware::{RequestIdExt, RequestIdLayer, ResolvedRequestId};
pub use router::router;
pub use state::AppState;

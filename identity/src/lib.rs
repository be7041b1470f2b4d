//! # Studia Identity
//!
//! User registration and email verification for the Studia backend.
//!
//! ## Features
//!
//! - **Provider traits**: user storage, cache, and mail behind traits,
//!   so the workflow is testable at memory speed
//! - **OTP verification**: six-digit, TTL-bounded, single-use challenges
//! - **Request-ID protocol**: generation, validation, and dedup for the
//!   HTTP correlation layer
//! - **Typed errors**: workflow failures are enum variants; numeric
//!   response codes exist only at the HTTP boundary
//!
//! ## Architecture
//!
//! ```text
//! UserService ── UserRepository (Postgres / mock)
//!            ├── CacheStore     (Redis / in-memory)
//!            └── MailSender     (SMTP / console / mock)
//! ```
//!
//! ## Example: registration and verification
//!
//! ```rust,ignore
//! use studia_identity::{OtpConfig, UserService};
//! use studia_identity::mocks::{InMemoryCacheStore, MockMailSender, MockUserRepository};
//!
//! let service = UserService::new(
//!     MockUserRepository::new(),
//!     InMemoryCacheStore::new(),
//!     MockMailSender::new(),
//!     OtpConfig::default(),
//! );
//!
//! let registered = service.create_user("alice", "hunter2", "a@example.com").await?;
//! // ... user reads the OTP out of their inbox ...
//! service.verify_email("123456", "a@example.com").await?;
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

pub mod config;
pub mod error;
pub mod otp;
pub mod providers;
pub mod request_id;
pub mod response;
pub mod service;
pub mod stores;

#[cfg(feature = "test-utils")]
pub mod mocks;

pub use config::{OtpConfig, RequestIdConfig};
pub use error::{IdentityError, Result};
pub use providers::{AccountStatus, CacheStore, MailSender, User, UserRepository};
pub use response::{Envelope, ResponseCode};
pub use service::{RegisteredUser, UserService};

//! Mock providers for testing.
//!
//! In-memory implementations of the provider traits, deterministic and
//! dependency-free. Available under the default `test-utils` feature so
//! downstream crates can exercise the workflow without Redis, Postgres,
//! or an SMTP relay.

pub mod cache;
pub mod mail;
pub mod user;

pub use cache::InMemoryCacheStore;
pub use mail::MockMailSender;
pub use user::MockUserRepository;

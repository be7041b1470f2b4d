//! HTTP handlers.
//!
//! Every handler answers with the shared envelope at transport status
//! 200; the application-level `code` field carries the outcome.

pub mod users;

pub use users::{create_user, ping, verify_email};

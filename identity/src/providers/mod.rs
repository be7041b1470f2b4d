//! Identity providers.
//!
//! This module defines traits for all external dependencies the
//! identity core calls into: the relational user store, the key/value
//! cache, and the mail sender. Providers are interfaces, not
//! implementations — the workflow depends on these traits, and the
//! application wires concrete implementations at startup.
//!
//! This enables:
//! - **Testing**: in-memory mocks, deterministic and fast
//! - **Production**: PostgreSQL, Redis, SMTP
//! - **Development**: console mail, instrumented stores

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod cache;
pub mod console_mail;
pub mod mail;
pub mod smtp_mail;
pub mod user;

// Re-export provider traits and implementations
pub use cache::CacheStore;
pub use console_mail::ConsoleMailSender;
pub use mail::MailSender;
pub use smtp_mail::SmtpMailSender;
pub use user::UserRepository;

/// Account lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountStatus {
    /// Created but not yet activated.
    Inactive,

    /// Active account.
    Active,
}

impl AccountStatus {
    /// Numeric storage value for this status.
    #[must_use]
    pub const fn value(self) -> i16 {
        match self {
            Self::Inactive => 0,
            Self::Active => 1,
        }
    }

    /// Parse a numeric storage value.
    ///
    /// Returns `None` for values outside the known set.
    #[must_use]
    pub const fn from_value(value: i16) -> Option<Self> {
        match value {
            0 => Some(Self::Inactive),
            1 => Some(Self::Active),
            _ => None,
        }
    }
}

/// User identity record.
///
/// Owned by the relational store. The password is only ever held here
/// as an irreversible bcrypt hash; the workflow never persists or logs
/// cleartext.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Immutable unique ID, server-generated (UUID v4).
    pub user_id: String,

    /// Globally unique username.
    pub username: String,

    /// Globally unique email address.
    pub email: String,

    /// Bcrypt password hash.
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    /// Email verified flag.
    pub email_verified: bool,

    /// Phone verified flag.
    pub phone_verified: bool,

    /// Account status.
    pub status: AccountStatus,

    /// Account created timestamp.
    pub created_at: DateTime<Utc>,

    /// Last updated timestamp.
    pub updated_at: DateTime<Utc>,
}

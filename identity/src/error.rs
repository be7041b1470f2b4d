//! Error types for identity operations.

use thiserror::Error;

/// Result type alias for identity operations.
pub type Result<T> = std::result::Result<T, IdentityError>;

/// Error taxonomy for the identity core.
///
/// Variants are grouped by concern: input validation, conflicts,
/// missing records, and dependency failures. Validation and conflict
/// errors map to stable response codes at the boundary; dependency
/// failures collapse to a generic internal code so backend details
/// never reach clients.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentityError {
    // ═══════════════════════════════════════════════════════════
    // Input Validation
    // ═══════════════════════════════════════════════════════════
    /// Username is empty or malformed.
    #[error("invalid username")]
    InvalidUsername,

    /// Email is empty or malformed.
    #[error("invalid email")]
    InvalidEmail,

    /// Password is empty.
    #[error("password cannot be empty")]
    EmptyPassword,

    /// Account status value outside the known set.
    #[error("invalid account status")]
    InvalidStatus,

    /// OTP is empty or does not match the stored challenge.
    #[error("invalid OTP provided")]
    InvalidOtp,

    /// OTP challenge expired or was already consumed.
    #[error("OTP has expired")]
    OtpExpired,

    // ═══════════════════════════════════════════════════════════
    // Conflicts / Missing Records
    // ═══════════════════════════════════════════════════════════
    /// Username or email already registered.
    #[error("user already exists")]
    UserAlreadyExists,

    /// No user record for the given key.
    #[error("user not found")]
    UserNotFound,

    // ═══════════════════════════════════════════════════════════
    // Dependency Failures
    // ═══════════════════════════════════════════════════════════
    /// Relational store operation failed.
    #[error("database error: {0}")]
    DatabaseError(String),

    /// Cache backend unreachable or misbehaving.
    ///
    /// Distinct from a key miss, which is `Ok(None)` on the cache
    /// contract. Callers decide whether to degrade or fail.
    #[error("cache unavailable: {0}")]
    CacheUnavailable(String),

    /// Mail provider rejected or failed the send.
    #[error("failed to send email: {0}")]
    MailSendFailed(String),

    /// Anything else that should not be exposed to users.
    #[error("internal error: {0}")]
    InternalError(String),
}

impl IdentityError {
    /// Returns `true` if this error is caused by invalid user input
    /// rather than a backend fault.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidUsername
                | Self::InvalidEmail
                | Self::EmptyPassword
                | Self::InvalidStatus
                | Self::InvalidOtp
                | Self::OtpExpired
                | Self::UserAlreadyExists
        )
    }

    /// Returns `true` if this error indicates a dependency failure
    /// that should be logged with context and collapsed at the boundary.
    #[must_use]
    pub const fn is_dependency_failure(&self) -> bool {
        matches!(
            self,
            Self::DatabaseError(_)
                | Self::CacheUnavailable(_)
                | Self::MailSendFailed(_)
                | Self::InternalError(_)
        )
    }
}

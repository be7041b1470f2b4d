//! Response codec: stable numeric codes and the wire envelope.
//!
//! The code space is partitioned by concern: `200` for success,
//! `2001..=2013` for identity outcomes, `3001..=3006` for mail
//! outcomes. A fixed code always renders the same canonical message
//! unless the caller supplies an override; unknown codes fall back to
//! a generic message rather than failing.

use crate::error::IdentityError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Application-level result code carried in every envelope.
///
/// Crosses the wire as its numeric `value()`; the envelope stores the
/// raw number so unknown codes stay representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseCode {
    /// Operation succeeded.
    Success,

    /// Registration failed for an internal reason.
    RegisterInternalError,
    /// Username or email already registered.
    UserAlreadyExists,
    /// No user record for the given key.
    UserNotFound,
    /// User lookup failed for a backend reason.
    FailedGetUser,
    /// User mutation failed for a backend reason.
    FailedUpdateUser,
    /// Request body or parameters failed validation.
    InvalidInput,
    /// OTP missing or mismatched.
    InvalidOtp,
    /// OTP challenge expired or already consumed.
    OtpExpired,
    /// Email has not been verified yet.
    EmailNotVerified,
    /// Phone number has not been verified yet.
    PhoneNotVerified,
    /// Email field empty or malformed.
    InvalidEmail,
    /// Username field empty or malformed.
    InvalidUsername,
    /// Password field empty.
    EmptyPassword,

    /// Mail provider rejected or failed the send.
    MailSendFailed,
}

impl ResponseCode {
    /// Numeric wire value for this code.
    #[must_use]
    pub const fn value(self) -> u16 {
        match self {
            Self::Success => 200,
            Self::RegisterInternalError => 2001,
            Self::UserAlreadyExists => 2002,
            Self::UserNotFound => 2003,
            Self::FailedGetUser => 2004,
            Self::FailedUpdateUser => 2005,
            Self::InvalidInput => 2006,
            Self::InvalidOtp => 2007,
            Self::OtpExpired => 2008,
            Self::EmailNotVerified => 2009,
            Self::PhoneNotVerified => 2010,
            Self::InvalidEmail => 2011,
            Self::InvalidUsername => 2012,
            Self::EmptyPassword => 2013,
            Self::MailSendFailed => 3006,
        }
    }

    /// Canonical human-readable message for this code.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::RegisterInternalError => "Registration failed, please try again later",
            Self::UserAlreadyExists => "User already exists",
            Self::UserNotFound => "User not found",
            Self::FailedGetUser => "Failed to retrieve user",
            Self::FailedUpdateUser => "Failed to update user",
            Self::InvalidInput => "Invalid input parameters",
            Self::InvalidOtp => "Invalid OTP provided",
            Self::OtpExpired => "OTP has expired",
            Self::EmailNotVerified => "Email not verified",
            Self::PhoneNotVerified => "Phone number not verified",
            Self::InvalidEmail => "Invalid email format",
            Self::InvalidUsername => "Invalid username format",
            Self::EmptyPassword => "Password cannot be empty",
            Self::MailSendFailed => "Failed to send verification email",
        }
    }

    /// Canonical message for an arbitrary numeric code.
    ///
    /// Unknown codes render a generic message rather than failing, so
    /// clients always receive something resolvable.
    #[must_use]
    pub fn message_for(code: u16) -> &'static str {
        match Self::try_from(code) {
            Ok(known) => known.message(),
            Err(()) => "Unknown error occurred",
        }
    }
}

impl From<ResponseCode> for u16 {
    fn from(code: ResponseCode) -> Self {
        code.value()
    }
}

impl TryFrom<u16> for ResponseCode {
    type Error = ();

    fn try_from(value: u16) -> std::result::Result<Self, ()> {
        Ok(match value {
            200 => Self::Success,
            2001 => Self::RegisterInternalError,
            2002 => Self::UserAlreadyExists,
            2003 => Self::UserNotFound,
            2004 => Self::FailedGetUser,
            2005 => Self::FailedUpdateUser,
            2006 => Self::InvalidInput,
            2007 => Self::InvalidOtp,
            2008 => Self::OtpExpired,
            2009 => Self::EmailNotVerified,
            2010 => Self::PhoneNotVerified,
            2011 => Self::InvalidEmail,
            2012 => Self::InvalidUsername,
            2013 => Self::EmptyPassword,
            3006 => Self::MailSendFailed,
            _ => return Err(()),
        })
    }
}

impl From<&IdentityError> for ResponseCode {
    fn from(err: &IdentityError) -> Self {
        match err {
            IdentityError::InvalidUsername => Self::InvalidUsername,
            IdentityError::InvalidEmail => Self::InvalidEmail,
            IdentityError::EmptyPassword => Self::EmptyPassword,
            IdentityError::InvalidStatus => Self::InvalidInput,
            IdentityError::InvalidOtp => Self::InvalidOtp,
            IdentityError::OtpExpired => Self::OtpExpired,
            IdentityError::UserAlreadyExists => Self::UserAlreadyExists,
            IdentityError::UserNotFound => Self::UserNotFound,
            IdentityError::MailSendFailed(_) => Self::MailSendFailed,
            // Dependency failures collapse to the generic internal code;
            // the underlying error is logged where it happened.
            IdentityError::DatabaseError(_)
            | IdentityError::CacheUnavailable(_)
            | IdentityError::InternalError(_) => Self::RegisterInternalError,
        }
    }
}

/// Wire-level result wrapper shared by success and error paths.
///
/// Clients parse a single schema regardless of outcome; the transport
/// status is always 200 and `code` carries the application result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    /// Application result code.
    pub code: u16,
    /// Human-readable message for `code`.
    pub message: String,
    /// Success payload, if any.
    pub content: Option<Value>,
    /// Error detail, if any.
    pub error: Option<Value>,
}

impl Envelope {
    /// Build a success envelope with the canonical message.
    #[must_use]
    pub fn success(content: Value) -> Self {
        Self {
            code: ResponseCode::Success.value(),
            message: ResponseCode::Success.message().to_string(),
            content: Some(content),
            error: None,
        }
    }

    /// Build an error envelope with the canonical message for `code`.
    #[must_use]
    pub fn error(code: ResponseCode) -> Self {
        Self {
            code: code.value(),
            message: code.message().to_string(),
            content: None,
            error: None,
        }
    }

    /// Build an error envelope with an overriding message.
    #[must_use]
    pub fn error_with_message(code: ResponseCode, message: impl Into<String>) -> Self {
        Self {
            code: code.value(),
            message: message.into(),
            content: None,
            error: None,
        }
    }
}

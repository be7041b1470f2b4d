//! One-time-password generation for email verification.

use rand::rngs::OsRng;
use rand::Rng;

/// Cache key prefix for OTP challenges, scoped by email.
pub const OTP_KEY_PREFIX: &str = "user_otp:";

/// Ledger key for the OTP challenge bound to `email`.
///
/// One key per email: a new registration for the same address
/// overwrites any live challenge.
#[must_use]
pub fn otp_key(email: &str) -> String {
    format!("{OTP_KEY_PREFIX}{email}")
}

/// Generate a uniformly random six-digit OTP.
///
/// Draws from a cryptographically secure source over the inclusive
/// range [100000, 999999]. `gen_range` over a uniform integer
/// distribution is free of modulo bias.
#[must_use]
pub fn generate_six_digit_otp() -> u32 {
    OsRng.gen_range(100_000..=999_999)
}

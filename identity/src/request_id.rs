//! Request-ID generation, validation, and deduplication.
//!
//! Every inbound request carries exactly one correlation identifier: a
//! lowercase-hex token of 16–64 characters. Clients may supply their
//! own via the `X-Request-ID` header; the pipeline validates it and
//! checks a sliding-window dedup ledger in the cache, regenerating the
//! ID whenever the supplied one is malformed or already live.
//!
//! Deduplication is a soft guarantee: the ledger check is a read
//! followed by a later write, so two simultaneous requests racing on
//! the same externally-supplied ID can both pass. Cache outages never
//! block a request.

use crate::error::Result;
use crate::providers::CacheStore;
use chrono::Duration;
use rand::rngs::OsRng;
use rand::RngCore;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Header carrying the client-supplied request ID.
pub const REQUEST_ID_HEADER: &str = "X-Request-ID";

/// Minimum accepted token length.
pub const MIN_LENGTH: usize = 16;

/// Maximum accepted token length.
pub const MAX_LENGTH: usize = 64;

/// Cache key prefix for the dedup ledger.
pub const DEDUP_KEY_PREFIX: &str = "request_id:";

/// How long a seen ID stays in the dedup ledger.
#[must_use]
pub fn dedup_ttl() -> Duration {
    Duration::seconds(3600)
}

/// Where a resolved request ID came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    /// The client's header value was accepted as-is.
    ClientSupplied,

    /// The server generated (or regenerated) the ID.
    ServerGenerated,
}

/// Why a candidate token was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidRequestId {
    /// Shorter than [`MIN_LENGTH`].
    #[error("request ID too short, minimum {MIN_LENGTH} characters required")]
    TooShort,

    /// Longer than [`MAX_LENGTH`].
    #[error("request ID too long, maximum {MAX_LENGTH} characters allowed")]
    TooLong,

    /// Contains a byte outside `[a-f0-9]`.
    #[error("request ID must contain only lowercase hexadecimal characters (a-f, 0-9)")]
    NotLowercaseHex,
}

/// Generate a fresh request ID.
///
/// The token is 8 hex characters derived from the unix-nanosecond
/// clock followed by 32 hex characters of cryptographically random
/// material — 40 characters total, valid by construction, practically
/// unique without a central sequence.
#[must_use]
pub fn generate() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let timestamp_hex = format!("{nanos:016x}");

    let mut bytes = [0u8; 16];
    OsRng.fill_bytes(&mut bytes);
    let random_hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();

    // 8 timestamp chars + 32 random chars = 40, inside [16, 64].
    format!("{}{random_hex}", &timestamp_hex[..8])
}

/// Validate a candidate token's length and alphabet.
///
/// Never panics, whatever the input — empty, overlong, or non-ASCII
/// strings are all rejected with a human-readable reason.
///
/// # Errors
///
/// Returns [`InvalidRequestId`] describing the first failed check.
pub fn validate(token: &str) -> std::result::Result<(), InvalidRequestId> {
    if token.len() < MIN_LENGTH {
        return Err(InvalidRequestId::TooShort);
    }
    if token.len() > MAX_LENGTH {
        return Err(InvalidRequestId::TooLong);
    }
    if !token
        .bytes()
        .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
    {
        return Err(InvalidRequestId::NotLowercaseHex);
    }
    Ok(())
}

/// Check whether `token` is already present in the dedup ledger.
///
/// A ledger miss means not duplicate. A backend fault is propagated as
/// an error value; the caller decides policy (the pipeline logs it and
/// proceeds as if not duplicate).
///
/// # Errors
///
/// Returns `IdentityError::CacheUnavailable` if the ledger cannot be
/// queried.
pub async fn is_duplicate<C: CacheStore>(cache: &C, token: &str) -> Result<bool> {
    let key = format!("{DEDUP_KEY_PREFIX}{token}");
    Ok(cache.get(&key).await?.is_some())
}

/// Record `token` in the dedup ledger with the default expiry window.
///
/// # Errors
///
/// Returns `IdentityError::CacheUnavailable` if the write fails.
pub async fn store<C: CacheStore>(cache: &C, token: &str) -> Result<()> {
    store_with_ttl(cache, token, dedup_ttl()).await
}

/// Record `token` in the dedup ledger with a caller-chosen window.
///
/// # Errors
///
/// Returns `IdentityError::CacheUnavailable` if the write fails.
pub async fn store_with_ttl<C: CacheStore>(cache: &C, token: &str, ttl: Duration) -> Result<()> {
    let key = format!("{DEDUP_KEY_PREFIX}{token}");
    cache.set_with_expiry(&key, "1", ttl).await
}

/// Best-effort coercion of an arbitrary string into a valid token.
///
/// Lowercases, strips non-hex characters, left-zero-pads to the
/// minimum length, and truncates to the maximum. Only for callers who
/// explicitly choose leniency — the pipeline regenerates instead of
/// normalizing client input.
#[must_use]
pub fn normalize(token: &str) -> String {
    let mut normalized: String = token
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_digit() || ('a'..='f').contains(c))
        .collect();

    if normalized.len() < MIN_LENGTH {
        normalized = format!("{}{normalized}", "0".repeat(MIN_LENGTH - normalized.len()));
    }
    if normalized.len() > MAX_LENGTH {
        normalized.truncate(MAX_LENGTH);
    }
    normalized
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClientSupplied => write!(f, "client-supplied"),
            Self::ServerGenerated => write!(f, "server-generated"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::mocks::InMemoryCacheStore;
    use std::collections::HashSet;

    #[test]
    fn generated_tokens_are_valid_by_construction() {
        for _ in 0..100 {
            let token = generate();
            assert_eq!(token.len(), 40);
            assert!(validate(&token).is_ok(), "invalid token: {token}");
        }
    }

    #[test]
    fn generation_never_collides() {
        let mut seen = HashSet::new();
        for _ in 0..10_000 {
            assert!(seen.insert(generate()), "collision after {} draws", seen.len());
        }
    }

    #[test]
    fn valid_tokens_pass() {
        assert!(validate("abcdef0123456789").is_ok());
        assert!(validate(&"a".repeat(64)).is_ok());
        assert!(validate(&"0".repeat(16)).is_ok());
    }

    #[test]
    fn short_tokens_are_rejected() {
        assert_eq!(validate(""), Err(InvalidRequestId::TooShort));
        assert_eq!(validate("abcdef012345678"), Err(InvalidRequestId::TooShort));
    }

    #[test]
    fn long_tokens_are_rejected() {
        assert_eq!(validate(&"a".repeat(65)), Err(InvalidRequestId::TooLong));
        assert_eq!(validate(&"0".repeat(1000)), Err(InvalidRequestId::TooLong));
    }

    #[test]
    fn non_hex_tokens_are_rejected() {
        assert_eq!(
            validate("ABCDEF0123456789"),
            Err(InvalidRequestId::NotLowercaseHex)
        );
        assert_eq!(
            validate("abcdef012345678g"),
            Err(InvalidRequestId::NotLowercaseHex)
        );
        assert_eq!(
            validate("abcdef-123456789"),
            Err(InvalidRequestId::NotLowercaseHex)
        );
    }

    #[test]
    fn rejection_reasons_are_human_readable() {
        let reason = validate("short").unwrap_err().to_string();
        assert!(reason.contains("too short"));

        let reason = validate(&"z".repeat(20)).unwrap_err().to_string();
        assert!(reason.contains("lowercase hexadecimal"));
    }

    #[test]
    fn normalize_lowercases_and_strips() {
        assert_eq!(normalize("ABCDEF0123456789"), "abcdef0123456789");
        assert_eq!(normalize("ab-cd_ef01234567 89xy"), "abcdef0123456789");
    }

    #[test]
    fn normalize_pads_short_input() {
        let normalized = normalize("abc");
        assert_eq!(normalized.len(), MIN_LENGTH);
        assert!(normalized.starts_with("0000000000000"));
        assert!(normalized.ends_with("abc"));
    }

    #[test]
    fn normalize_truncates_long_input() {
        let normalized = normalize(&"a".repeat(100));
        assert_eq!(normalized.len(), MAX_LENGTH);
    }

    #[test]
    fn normalized_output_always_validates() {
        for input in ["", "XYZ", &"F".repeat(200), "hello world", "deadbeef"] {
            assert!(validate(&normalize(input)).is_ok(), "input: {input}");
        }
    }

    #[tokio::test]
    async fn unseen_token_is_not_duplicate() {
        let cache = InMemoryCacheStore::new();
        let token = generate();
        assert!(!is_duplicate(&cache, &token).await.unwrap());
    }

    #[tokio::test]
    async fn stored_token_is_duplicate() {
        let cache = InMemoryCacheStore::new();
        let token = generate();

        store(&cache, &token).await.unwrap();
        assert!(is_duplicate(&cache, &token).await.unwrap());
    }

    #[tokio::test]
    async fn ledger_failure_propagates_as_error() {
        let cache = InMemoryCacheStore::new();
        cache.fail_next_ops();

        let token = generate();
        assert!(is_duplicate(&cache, &token).await.is_err());
    }
}

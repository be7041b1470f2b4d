//! Identity configuration.
//!
//! Configuration values are provided by the application at startup and
//! passed into the service container, never read from ambient globals.

use chrono::Duration;

/// OTP email-verification configuration.
#[derive(Debug, Clone)]
pub struct OtpConfig {
    /// Challenge time-to-live.
    ///
    /// Default: 60 seconds
    pub ttl: Duration,
}

impl OtpConfig {
    /// Create a new OTP configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ttl: Duration::seconds(60),
        }
    }

    /// Set the challenge time-to-live.
    #[must_use]
    pub const fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Request-ID dedup ledger configuration.
#[derive(Debug, Clone)]
pub struct RequestIdConfig {
    /// How long a seen request-ID stays in the dedup ledger.
    ///
    /// Default: 1 hour
    pub dedup_ttl: Duration,
}

impl RequestIdConfig {
    /// Create a new request-ID configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            dedup_ttl: Duration::seconds(3600),
        }
    }

    /// Set the dedup ledger time-to-live.
    #[must_use]
    pub const fn with_dedup_ttl(mut self, ttl: Duration) -> Self {
        self.dedup_ttl = ttl;
        self
    }
}

impl Default for RequestIdConfig {
    fn default() -> Self {
        Self::new()
    }
}

//! Retry scheduling for individual API requests.
//!
//! The schedule is a pure function of the attempt number and how the
//! attempt failed, kept separate from the transport so tests can inject a
//! delay-free policy and so the exponential curve is testable without a
//! server.

use std::time::Duration;

use reqwest::StatusCode;

/// Exponent cap for the backoff curve, bounding the worst-case pause even
/// with a generously configured attempt count.
const MAX_BACKOFF_EXPONENT: u32 = 6;

/// How a failed attempt should be classified for scheduling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// HTTP 429 or 504: the server is shedding load, back off exponentially.
    Throttled,
    /// Any other failure status or transport-level error: short fixed pause.
    Transient,
}

impl FailureClass {
    /// Classify a response status.
    #[must_use]
    pub fn from_status(status: StatusCode) -> Self {
        if status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::GATEWAY_TIMEOUT {
            Self::Throttled
        } else {
            Self::Transient
        }
    }
}

/// Delay schedule applied between request attempts.
///
/// Attempt `k` (zero-based) that fails throttled waits `2^k *
/// backoff_base` before attempt `k + 1`; other failures wait `flat_delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts per request before giving up.
    pub max_attempts: u32,
    /// Base duration for the exponential schedule.
    pub backoff_base: Duration,
    /// Fixed pause for non-throttle failures.
    pub flat_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base: Duration::from_secs(1),
            flat_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// A policy that retries without pausing. For tests.
    #[must_use]
    pub const fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            backoff_base: Duration::ZERO,
            flat_delay: Duration::ZERO,
        }
    }

    /// Delay to wait after failed attempt `attempt` (zero-based), or `None`
    /// when no attempts remain and the caller should give up.
    #[must_use]
    pub fn delay_after(&self, attempt: u32, class: FailureClass) -> Option<Duration> {
        if attempt + 1 >= self.max_attempts {
            return None;
        }
        let delay = match class {
            FailureClass::Throttled => {
                let factor = 1_u32 << attempt.min(MAX_BACKOFF_EXPONENT);
                self.backoff_base.saturating_mul(factor)
            }
            FailureClass::Transient => self.flat_delay,
        };
        Some(delay)
    }
}

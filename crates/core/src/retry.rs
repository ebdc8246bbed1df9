//! Retry policy with backoff
//!
//! Describes *when* a failed request may be retried and *how long* to wait
//! before the next attempt:
//! - Fixed, linear or exponential backoff, optionally with jitter
//! - An explicit set of retryable HTTP status codes
//! - Toggles for timeout and connection failures
//!
//! # Example
//!
//! ```rust
//! use smarty_core::retry::{Backoff, RetryConfig};
//! use std::time::Duration;
//!
//! let config = RetryConfig::default()
//!     .with_max_retries(3)
//!     .with_backoff(Backoff::fixed(Duration::from_millis(250)));
//!
//! assert!(config.should_retry_status(503));
//! assert!(!config.should_retry_status(401));
//! assert_eq!(config.delay_for_attempt(2), Duration::from_millis(250));
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Status codes retried by default in addition to the 5xx range
pub const DEFAULT_RETRYABLE_STATUSES: [u16; 2] = [408, 429];

/// Longest wait accepted from a server's `Retry-After` hint
pub const DEFAULT_MAX_RETRY_AFTER: Duration = Duration::from_secs(10);

/// Backoff strategy between attempts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Backoff {
    /// Same delay before every retry
    Fixed {
        /// Delay between retries
        #[serde(with = "duration_millis")]
        delay: Duration,
    },
    /// Delay grows by `step` per retry up to `max`
    Linear {
        /// Increment per retry
        #[serde(with = "duration_millis")]
        step: Duration,
        /// Upper bound on the delay
        #[serde(with = "duration_millis")]
        max: Duration,
    },
    /// Delay is `initial * multiplier^(retry - 1)`, capped at `max`
    Exponential {
        /// Delay before the first retry
        #[serde(with = "duration_millis")]
        initial: Duration,
        /// Growth factor per retry
        multiplier: f64,
        /// Upper bound on the delay
        #[serde(with = "duration_millis")]
        max: Duration,
        /// Add up to 25% random jitter
        jitter: bool,
    },
}

impl Default for Backoff {
    fn default() -> Self {
        Self::Exponential {
            initial: Duration::from_millis(500),
            multiplier: 2.0,
            max: Duration::from_secs(10),
            jitter: true,
        }
    }
}

impl Backoff {
    /// Fixed delay between retries
    #[must_use]
    pub fn fixed(delay: Duration) -> Self {
        Self::Fixed { delay }
    }

    /// One second more per retry, capped at ten seconds
    #[must_use]
    pub fn linear() -> Self {
        Self::Linear {
            step: Duration::from_secs(1),
            max: Duration::from_secs(10),
        }
    }

    /// Exponential backoff without jitter
    #[must_use]
    pub fn exponential(initial: Duration, multiplier: f64, max: Duration) -> Self {
        Self::Exponential {
            initial,
            multiplier,
            max,
            jitter: false,
        }
    }

    /// Calculate the delay before retry number `attempt`
    ///
    /// `attempt` is 1-based (the first retry is attempt 1). Attempt 0 is the
    /// initial send and never waits.
    #[must_use]
    pub fn delay(self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        match self {
            Self::Fixed { delay } => delay,
            Self::Linear { step, max } => step.saturating_mul(attempt).min(max),
            Self::Exponential {
                initial,
                multiplier,
                max,
                jitter,
            } => {
                let exponent = i32::try_from(attempt - 1).unwrap_or(i32::MAX);
                let base = initial.as_secs_f64() * multiplier.powi(exponent);
                let capped = base.min(max.as_secs_f64());

                let secs = if jitter {
                    capped * (1.0 + fastrand::f64() * 0.25)
                } else {
                    capped
                };

                Duration::try_from_secs_f64(secs).unwrap_or(max)
            }
        }
    }
}

/// Retry configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retries; total attempts are `max_retries + 1`
    pub max_retries: u32,
    /// Backoff strategy between attempts
    pub backoff: Backoff,
    /// Status codes that trigger a retry
    pub retry_on_status: Vec<u16>,
    /// Retry every 5xx status, whether or not it is listed
    pub retry_server_errors: bool,
    /// Retry when the request timed out
    pub retry_on_timeout: bool,
    /// Retry when the connection could not be established
    pub retry_on_connect: bool,
    /// Wait for the server's `Retry-After` hint on 429 responses
    pub honor_retry_after: bool,
    /// Upper bound on a `Retry-After` wait
    #[serde(with = "duration_millis")]
    pub max_retry_after: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            backoff: Backoff::default(),
            retry_on_status: DEFAULT_RETRYABLE_STATUSES.to_vec(),
            retry_server_errors: true,
            retry_on_timeout: true,
            retry_on_connect: true,
            honor_retry_after: true,
            max_retry_after: DEFAULT_MAX_RETRY_AFTER,
        }
    }
}

impl RetryConfig {
    /// Create a config with no retries
    #[must_use]
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Builder-style method to set the retry bound
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Builder-style method to set the backoff strategy
    #[must_use]
    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Builder-style method to replace the retryable status list
    #[must_use]
    pub fn with_retry_on_status(mut self, statuses: impl IntoIterator<Item = u16>) -> Self {
        self.retry_on_status = statuses.into_iter().collect();
        self
    }

    /// Builder-style method to bound the wait taken from `Retry-After`
    #[must_use]
    pub fn with_max_retry_after(mut self, max: Duration) -> Self {
        self.max_retry_after = max;
        self
    }

    /// Total number of attempts, including the first one
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Check if a given HTTP status code should trigger a retry
    #[must_use]
    pub fn should_retry_status(&self, status: u16) -> bool {
        self.retry_on_status.contains(&status)
            || (self.retry_server_errors && (500..600).contains(&status))
    }

    /// Calculate the delay before retry number `attempt` (1-based)
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.backoff.delay(attempt)
    }

    /// Delay to wait for a server `Retry-After` hint, capped at `max_retry_after`
    #[must_use]
    pub fn retry_after_delay(&self, hint: Duration) -> Duration {
        hint.min(self.max_retry_after)
    }
}

/// Serialize a [`Duration`] as whole milliseconds
///
/// Use with `#[serde(with = "smarty_core::retry::duration_millis")]`.
pub mod duration_millis {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    /// Write the duration as a `u64` millisecond count, saturating
    ///
    /// # Errors
    ///
    /// Returns the serializer's error.
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        u64::try_from(duration.as_millis())
            .unwrap_or(u64::MAX)
            .serialize(serializer)
    }

    /// Read a `u64` millisecond count
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not an unsigned integer.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let ms = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(ms))
    }
}

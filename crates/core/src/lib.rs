//! Resilience primitives for the Smarty API client
//!
//! This crate provides the transport-agnostic pieces of the retry pipeline:
//!
//! - **Retry policy**: bounded attempts, retryable status set, timeout and
//!   connection toggles
//! - **Backoff**: fixed, linear and exponential delays with optional jitter
//! - **Sleeper**: swappable delay between attempts (tokio timer or no-op)
//!
//! # Example
//!
//! ```rust
//! use smarty_core::prelude::*;
//! use std::time::Duration;
//!
//! let policy = RetryConfig::default().with_max_retries(2);
//! assert_eq!(policy.max_attempts(), 3);
//! assert!(policy.delay_for_attempt(1) >= Duration::from_millis(500));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod retry;
pub mod sleep;

pub use retry::{Backoff, RetryConfig};
pub use sleep::{NoopSleeper, Sleeper, TokioSleeper};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::retry::{Backoff, DEFAULT_MAX_RETRY_AFTER, DEFAULT_RETRYABLE_STATUSES, RetryConfig};
    pub use crate::sleep::{NoopSleeper, Sleeper, TokioSleeper};
}

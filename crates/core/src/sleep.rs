//! Delay abstraction used between retry attempts
//!
//! Production code waits on the tokio timer; tests swap in [`NoopSleeper`]
//! so retry loops run instantly.

use async_trait::async_trait;
use std::time::Duration;

/// Waits for a duration before the next attempt
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Suspend the calling task for `duration`
    async fn wait(&self, duration: Duration);
}

/// Sleeps on the tokio timer; only the calling task is suspended
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn wait(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}

/// Returns immediately
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSleeper;

#[async_trait]
impl Sleeper for NoopSleeper {
    async fn wait(&self, _duration: Duration) {}
}

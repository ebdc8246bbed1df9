//! Retries transient failures with backoff

use super::Sender;
use crate::error::{ApiError, ApiResult, TransportErrorKind};
use crate::request::{Request, Response};
use async_trait::async_trait;
use smarty_core::retry::RetryConfig;
use smarty_core::sleep::Sleeper;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Receives every failed attempt that qualified for a retry
///
/// Implementations are shared across concurrent sends.
pub trait RetryLogger: Send + Sync {
    /// Record that attempt number `attempt` (1-based) failed with `error`
    fn record(&self, attempt: u32, error: &ApiError);
}

impl<L: RetryLogger + ?Sized> RetryLogger for Arc<L> {
    fn record(&self, attempt: u32, error: &ApiError) {
        (**self).record(attempt, error);
    }
}

/// Emits a `warn` event per failed attempt
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingRetryLogger;

impl RetryLogger for TracingRetryLogger {
    fn record(&self, attempt: u32, error: &ApiError) {
        warn!(attempt, error = %error, "request attempt failed");
    }
}

/// Re-sends the same request while failures are transient
pub struct RetrySender {
    config: RetryConfig,
    inner: Box<dyn Sender>,
    sleeper: Arc<dyn Sleeper>,
    logger: Arc<dyn RetryLogger>,
}

impl RetrySender {
    /// Wrap `inner` with the given policy, sleeper and logger
    pub fn new(
        config: RetryConfig,
        inner: Box<dyn Sender>,
        sleeper: Arc<dyn Sleeper>,
        logger: Arc<dyn RetryLogger>,
    ) -> Self {
        Self {
            config,
            inner,
            sleeper,
            logger,
        }
    }

    /// The retry policy
    #[must_use]
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Check if `error` is transient under this policy
    #[must_use]
    pub fn is_retryable(&self, error: &ApiError) -> bool {
        match error {
            ApiError::Transport { kind, .. } => match kind {
                TransportErrorKind::Timeout => self.config.retry_on_timeout,
                TransportErrorKind::Connect => self.config.retry_on_connect,
                TransportErrorKind::Other => true,
            },
            ApiError::Status { status, .. } => self.config.should_retry_status(*status),
            _ => false,
        }
    }

    fn delay_before(&self, retry: u32, error: &ApiError) -> Duration {
        if self.config.honor_retry_after {
            if let ApiError::Status {
                status: 429,
                retry_after: Some(hint),
                ..
            } = error
            {
                return self.config.retry_after_delay(*hint);
            }
        }
        self.config.delay_for_attempt(retry)
    }
}

#[async_trait]
impl Sender for RetrySender {
    async fn send(&self, request: Request) -> ApiResult<Response> {
        let max_attempts = self.config.max_attempts();
        let mut attempt = 1;

        loop {
            let error = match self.inner.send(request.clone()).await {
                Ok(response) => {
                    if attempt > 1 {
                        debug!(attempt, "request succeeded after retry");
                    }
                    return Ok(response);
                }
                Err(e) if !self.is_retryable(&e) => return Err(e),
                Err(e) => e,
            };

            self.logger.record(attempt, &error);

            if attempt >= max_attempts {
                return Err(ApiError::RetriesExhausted {
                    attempts: attempt,
                    last: Box::new(error),
                });
            }

            let delay = self.delay_before(attempt, &error);
            debug!(
                attempt,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                "retrying after delay"
            );
            self.sleeper.wait(delay).await;
            attempt += 1;
        }
    }
}

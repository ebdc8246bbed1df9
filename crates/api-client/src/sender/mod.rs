//! The sender chain
//!
//! Every stage implements [`Sender`] and owns the next stage. The default
//! chain assembled by the builder, outermost first:
//!
//! ```text
//! UrlPrefixSender -> SigningSender -> RetrySender -> StatusSender -> HttpSender
//! ```
//!
//! Signing and retrying are skipped when no credentials are configured or
//! retries are disabled. Resilience primitives are re-exported from
//! `smarty-core`.

mod http;
mod retry;
mod signing;
mod status;
mod url_prefix;

pub use http::HttpSender;
pub use retry::{RetryLogger, RetrySender, TracingRetryLogger};
pub use signing::SigningSender;
pub use status::StatusSender;
pub use url_prefix::UrlPrefixSender;

pub use smarty_core::retry::{Backoff, RetryConfig};
pub use smarty_core::sleep::{NoopSleeper, Sleeper, TokioSleeper};

use crate::error::ApiResult;
use crate::request::{Request, Response};
use async_trait::async_trait;
use std::sync::Arc;

/// Sends a request and produces a response
#[async_trait]
pub trait Sender: Send + Sync {
    /// Send `request` to the next stage
    async fn send(&self, request: Request) -> ApiResult<Response>;
}

#[async_trait]
impl<S: Sender + ?Sized> Sender for Arc<S> {
    async fn send(&self, request: Request) -> ApiResult<Response> {
        (**self).send(request).await
    }
}

#[async_trait]
impl<S: Sender + ?Sized> Sender for Box<S> {
    async fn send(&self, request: Request) -> ApiResult<Response> {
        (**self).send(request).await
    }
}

//! Turns non-2xx responses into errors

use super::Sender;
use crate::error::{status_message, ApiError, ApiResult};
use crate::request::{Request, Response};
use async_trait::async_trait;
use std::time::Duration;

/// Passes 2xx responses through and fails everything else
pub struct StatusSender {
    inner: Box<dyn Sender>,
}

impl StatusSender {
    /// Wrap `inner`
    pub fn new(inner: Box<dyn Sender>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl Sender for StatusSender {
    async fn send(&self, request: Request) -> ApiResult<Response> {
        let response = self.inner.send(request).await?;

        if response.is_success() {
            return Ok(response);
        }

        Err(ApiError::Status {
            status: response.status,
            message: status_message(response.status).to_string(),
            body: response.text(),
            retry_after: retry_after(&response),
        })
    }
}

/// `Retry-After` in delay-seconds form
fn retry_after(response: &Response) -> Option<Duration> {
    response
        .header("retry-after")
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

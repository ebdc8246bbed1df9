//! Resolves relative request paths against the configured endpoint

use super::Sender;
use crate::error::ApiResult;
use crate::request::{Request, Response};
use async_trait::async_trait;

/// Prefixes every request with the endpoint URL
pub struct UrlPrefixSender {
    url_prefix: String,
    inner: Box<dyn Sender>,
}

impl UrlPrefixSender {
    /// Wrap `inner`, resolving paths against `url_prefix`
    pub fn new(url_prefix: impl Into<String>, inner: Box<dyn Sender>) -> Self {
        Self {
            url_prefix: url_prefix.into(),
            inner,
        }
    }

    /// The endpoint URL
    #[must_use]
    pub fn url_prefix(&self) -> &str {
        &self.url_prefix
    }

    /// Join the prefix and a relative path with exactly one `/`
    #[must_use]
    pub fn resolve(&self, path: &str) -> String {
        let base = self.url_prefix.trim_end_matches('/');
        if path.is_empty() {
            return base.to_string();
        }
        if path.starts_with('?') {
            return format!("{base}{path}");
        }
        format!("{base}/{}", path.trim_start_matches('/'))
    }
}

#[async_trait]
impl Sender for UrlPrefixSender {
    async fn send(&self, mut request: Request) -> ApiResult<Response> {
        request.url = self.resolve(&request.url);
        self.inner.send(request).await
    }
}

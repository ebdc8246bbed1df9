//! Authenticates requests before they leave the client

use super::Sender;
use crate::credentials::Credentials;
use crate::error::ApiResult;
use crate::request::{Request, Response};
use async_trait::async_trait;
use std::sync::Arc;

/// Signs each request with the configured credentials
pub struct SigningSender {
    signer: Arc<dyn Credentials>,
    inner: Box<dyn Sender>,
}

impl SigningSender {
    /// Wrap `inner`, signing with `signer`
    pub fn new(signer: Arc<dyn Credentials>, inner: Box<dyn Sender>) -> Self {
        Self { signer, inner }
    }
}

#[async_trait]
impl Sender for SigningSender {
    async fn send(&self, mut request: Request) -> ApiResult<Response> {
        self.signer.sign(&mut request)?;
        self.inner.send(request).await
    }
}

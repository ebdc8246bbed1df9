//! The reqwest-backed transport

use super::Sender;
use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};
use crate::request::{Method, Request, Response};
use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use reqwest::Client;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tracing::debug;

const TRACE_TARGET: &str = "smarty_api_client::transport";

/// User agent sent with every request
pub const DEFAULT_USER_AGENT: &str = concat!("smarty-rust-sdk/", env!("CARGO_PKG_VERSION"));

/// Performs the HTTP exchange
///
/// Owns one pooled `reqwest` client; clone the surrounding `Client` rather
/// than building new transports per request.
#[derive(Debug, Clone)]
pub struct HttpSender {
    inner: Client,
    timeout: Duration,
    debug: bool,
}

impl HttpSender {
    /// Build a transport from the client configuration
    pub fn new(config: &ClientConfig) -> ApiResult<Self> {
        let mut builder = Client::builder()
            .timeout(config.max_timeout)
            .connect_timeout(config.max_timeout)
            .user_agent(DEFAULT_USER_AGENT);

        if let Some(proxy) = &config.proxy {
            let proxy = reqwest::Proxy::all(proxy.url())
                .map_err(|e| ApiError::config(format!("invalid proxy {}: {e}", proxy.url())))?;
            builder = builder.proxy(proxy);
        }

        let inner = builder
            .build()
            .map_err(|e| ApiError::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            inner,
            timeout: config.max_timeout,
            debug: config.debug,
        })
    }

    /// Default per-request timeout
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Whether request and response traces are emitted
    #[must_use]
    pub fn is_debug(&self) -> bool {
        self.debug
    }

    fn trace_request(&self, request: &Request) {
        if !self.debug {
            return;
        }
        debug!(
            target: TRACE_TARGET,
            method = %request.method,
            url = %request.redacted_url(),
            headers = ?request.headers,
            payload_bytes = request.payload.as_ref().map_or(0, Vec::len),
            "sending request"
        );
    }

    fn trace_response(&self, response: &Response, elapsed: Duration) {
        if !self.debug {
            return;
        }
        debug!(
            target: TRACE_TARGET,
            status = response.status,
            payload_bytes = response.payload.len(),
            elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            body = %response.text(),
            "received response"
        );
    }
}

#[async_trait]
impl Sender for HttpSender {
    async fn send(&self, request: Request) -> ApiResult<Response> {
        self.trace_request(&request);

        let url = request.full_url();
        let mut builder = match request.method {
            Method::Get => self.inner.get(&url),
            Method::Post => self.inner.post(&url),
        };

        for (name, value) in &request.headers {
            if name.eq_ignore_ascii_case(USER_AGENT.as_str()) {
                continue;
            }
            builder = builder.header(name, value);
        }

        builder = builder.timeout(request.timeout.unwrap_or(self.timeout));

        if let Some(payload) = request.payload {
            builder = builder.body(payload);
        }

        let start = Instant::now();
        let response = builder.send().await?;

        let status = response.status().as_u16();
        let headers: BTreeMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
            })
            .collect();
        let payload = response.bytes().await?.to_vec();

        let response = Response {
            status,
            payload,
            headers,
        };
        self.trace_response(&response, start.elapsed());

        Ok(response)
    }
}

//! Configuration for the Smarty API client
//!
//! One immutable value built once and threaded into every stage of the
//! sender chain. Supports environment-based configuration with the defaults
//! of the official SDKs.

use crate::error::{ApiError, ApiResult};
use serde::{Deserialize, Serialize};
use smarty_core::retry::{Backoff, RetryConfig};
use std::time::Duration;

/// Default number of retries
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// Default request timeout
pub const DEFAULT_MAX_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP proxy through which all lookups are sent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Proxy host name or address
    pub host: String,
    /// Proxy port
    pub port: u16,
}

impl ProxyConfig {
    /// Create a proxy configuration
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Proxy URL in `http://host:port` form
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// Parse `host:port`
    pub fn parse(value: &str) -> ApiResult<Self> {
        let value = value
            .trim()
            .trim_start_matches("http://")
            .trim_end_matches('/');
        let (host, port) = value
            .rsplit_once(':')
            .ok_or_else(|| ApiError::config(format!("proxy must be host:port, got {value:?}")))?;
        let port = port
            .parse()
            .map_err(|_| ApiError::config(format!("invalid proxy port {port:?}")))?;
        Ok(Self::new(host, port))
    }
}

/// Client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Endpoint override; `None` uses the family's well-known URL
    pub url_prefix: Option<String>,
    /// Timeout for connecting and for reading the response
    #[serde(with = "smarty_core::retry::duration_millis")]
    pub max_timeout: Duration,
    /// Retry policy; `max_retries == 0` removes the retry stage
    pub retry: RetryConfig,
    /// HTTP proxy
    pub proxy: Option<ProxyConfig>,
    /// Trace requests and responses
    pub debug: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url_prefix: None,
            max_timeout: DEFAULT_MAX_TIMEOUT,
            retry: RetryConfig::default().with_max_retries(DEFAULT_MAX_RETRIES),
            proxy: None,
            debug: false,
        }
    }
}

impl ClientConfig {
    /// Create configuration from environment variables
    ///
    /// Reads the following environment variables, each optional:
    /// - `SMARTY_URL`: endpoint override
    /// - `SMARTY_MAX_RETRIES`: retry bound
    /// - `SMARTY_TIMEOUT_MS`: request timeout in milliseconds
    /// - `SMARTY_PROXY`: proxy as `host:port`
    /// - `SMARTY_DEBUG`: `1`/`true` enables request tracing
    pub fn from_env() -> ApiResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ApiResult<Self> {
        let mut config = Self::default();

        if let Some(url) = lookup("SMARTY_URL").filter(|v| !v.trim().is_empty()) {
            config.url_prefix = Some(url);
        }

        if let Some(retries) = lookup("SMARTY_MAX_RETRIES") {
            config.retry.max_retries = retries
                .trim()
                .parse()
                .map_err(|_| ApiError::config(format!("SMARTY_MAX_RETRIES is not a number: {retries:?}")))?;
        }

        if let Some(timeout) = lookup("SMARTY_TIMEOUT_MS") {
            let ms: u64 = timeout
                .trim()
                .parse()
                .map_err(|_| ApiError::config(format!("SMARTY_TIMEOUT_MS is not a number: {timeout:?}")))?;
            config.max_timeout = Duration::from_millis(ms);
        }

        if let Some(proxy) = lookup("SMARTY_PROXY").filter(|v| !v.trim().is_empty()) {
            config.proxy = Some(ProxyConfig::parse(&proxy)?);
        }

        config.debug = lookup("SMARTY_DEBUG")
            .is_some_and(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"));

        config.validate()?;
        Ok(config)
    }

    /// Builder-style method to set the endpoint override
    #[must_use]
    pub fn with_url_prefix(mut self, url: impl Into<String>) -> Self {
        self.url_prefix = Some(url.into());
        self
    }

    /// Builder-style method to set the timeout
    #[must_use]
    pub fn with_max_timeout(mut self, timeout: Duration) -> Self {
        self.max_timeout = timeout;
        self
    }

    /// Builder-style method to set the retry bound
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.retry.max_retries = max_retries;
        self
    }

    /// Builder-style method to set the backoff strategy
    #[must_use]
    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.retry.backoff = backoff;
        self
    }

    /// Builder-style method to replace the retry policy
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Builder-style method to set the proxy
    #[must_use]
    pub fn with_proxy(mut self, proxy: ProxyConfig) -> Self {
        self.proxy = Some(proxy);
        self
    }

    /// Builder-style method to toggle request tracing
    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Endpoint for a family, preferring the override
    #[must_use]
    pub fn resolve_url(&self, default_url: &str) -> String {
        self.url_prefix
            .clone()
            .unwrap_or_else(|| default_url.to_string())
    }

    /// Validate the configuration
    pub fn validate(&self) -> ApiResult<()> {
        if let Some(url) = &self.url_prefix {
            if url.is_empty() {
                return Err(ApiError::config("url_prefix cannot be empty"));
            }
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ApiError::config("url_prefix must start with http:// or https://"));
            }
        }

        if self.max_timeout.is_zero() {
            return Err(ApiError::config("max_timeout cannot be zero"));
        }

        if let Some(proxy) = &self.proxy {
            if proxy.host.trim().is_empty() {
                return Err(ApiError::config("proxy host cannot be empty"));
            }
            if proxy.port == 0 {
                return Err(ApiError::config("proxy port cannot be zero"));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.retry.max_retries, 5);
        assert_eq!(config.max_timeout, Duration::from_secs(10));
        assert!(config.url_prefix.is_none());
        assert!(config.proxy.is_none());
        assert!(!config.debug);
    }

    #[test]
    fn test_builder_pattern() {
        let config = ClientConfig::default()
            .with_url_prefix("http://localhost:8080/street-address")
            .with_max_timeout(Duration::from_millis(500))
            .with_max_retries(2);

        assert_eq!(
            config.url_prefix.as_deref(),
            Some("http://localhost:8080/street-address")
        );
        assert_eq!(config.max_timeout, Duration::from_millis(500));
        assert_eq!(config.retry.max_retries, 2);
    }

    #[test]
    fn test_resolve_url_prefers_override() {
        let default = ClientConfig::default();
        assert_eq!(default.resolve_url("https://a.test"), "https://a.test");

        let custom = default.with_url_prefix("https://b.test");
        assert_eq!(custom.resolve_url("https://a.test"), "https://b.test");
    }

    #[test]
    fn test_validation() {
        assert!(ClientConfig::default().validate().is_ok());
        assert!(ClientConfig::default().with_url_prefix("").validate().is_err());
        assert!(ClientConfig::default()
            .with_url_prefix("ftp://example.test")
            .validate()
            .is_err());
        assert!(ClientConfig::default()
            .with_max_timeout(Duration::ZERO)
            .validate()
            .is_err());
        assert!(ClientConfig::default()
            .with_proxy(ProxyConfig::new("proxy.local", 0))
            .validate()
            .is_err());
    }

    #[test]
    fn test_proxy_parse() {
        assert_eq!(
            ProxyConfig::parse("proxy.local:3128").unwrap(),
            ProxyConfig::new("proxy.local", 3128)
        );
        assert_eq!(
            ProxyConfig::parse("http://10.0.0.1:8080/").unwrap().url(),
            "http://10.0.0.1:8080"
        );
        assert!(ProxyConfig::parse("proxy.local").is_err());
        assert!(ProxyConfig::parse("proxy.local:http").is_err());
    }

    #[test]
    fn test_from_lookup() {
        let config = ClientConfig::from_lookup(env(&[
            ("SMARTY_URL", "http://localhost:9000/lookup"),
            ("SMARTY_MAX_RETRIES", "3"),
            ("SMARTY_TIMEOUT_MS", "2500"),
            ("SMARTY_PROXY", "proxy.local:3128"),
            ("SMARTY_DEBUG", "true"),
        ]))
        .unwrap();

        assert_eq!(config.url_prefix.as_deref(), Some("http://localhost:9000/lookup"));
        assert_eq!(config.retry.max_retries, 3);
        assert_eq!(config.max_timeout, Duration::from_millis(2500));
        assert_eq!(config.proxy, Some(ProxyConfig::new("proxy.local", 3128)));
        assert!(config.debug);
    }

    #[test]
    fn test_from_lookup_defaults_and_errors() {
        assert_eq!(ClientConfig::from_lookup(env(&[])).unwrap(), ClientConfig::default());
        assert!(ClientConfig::from_lookup(env(&[("SMARTY_MAX_RETRIES", "many")])).is_err());
        assert!(ClientConfig::from_lookup(env(&[("SMARTY_TIMEOUT_MS", "0")])).is_err());
    }

    #[test]
    fn test_config_serde_roundtrip_uses_millis() {
        let config = ClientConfig::default().with_max_timeout(Duration::from_millis(1500));
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["max_timeout"], 1500);
        assert_eq!(json["retry"]["max_retry_after"], 10_000);

        let back: ClientConfig = serde_json::from_value(json).unwrap();
        assert_eq!(back, config);
    }
}

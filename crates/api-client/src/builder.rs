//! Client assembly
//!
//! [`ClientBuilder`] collects configuration and collaborators, then builds a
//! [`Client`] for any API family with the sender chain wired in order.

use crate::client::{Client, Family};
use crate::config::{ClientConfig, ProxyConfig};
use crate::credentials::{Credentials, SharedCredentials, StaticCredentials};
use crate::endpoints::{
    InternationalStreet, UsAutocomplete, UsExtract, UsStreet, UsZipCode,
};
use crate::error::ApiResult;
use crate::sender::{
    Backoff, HttpSender, RetryLogger, RetrySender, Sender, SigningSender, Sleeper, StatusSender,
    TokioSleeper, TracingRetryLogger, UrlPrefixSender,
};
use crate::serializer::{JsonSerializer, Serializer};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Builds clients for the Smarty APIs
///
/// Every `build_*` method borrows the builder, so one builder can produce
/// clients for several families. A family's default endpoint applies only to
/// that build.
///
/// ```rust,no_run
/// use smarty_api_client::{ClientBuilder, UsStreetLookup};
/// use std::time::Duration;
///
/// # async fn run() -> smarty_api_client::ApiResult<()> {
/// let client = ClientBuilder::with_static_credentials("auth-id", "auth-token")
///     .retry_at_most(3)
///     .with_max_timeout(Duration::from_secs(5))
///     .build_us_street_api_client()?;
///
/// let mut lookup = UsStreetLookup::freeform("1600 Amphitheatre Pkwy, Mountain View, CA");
/// client.send(&mut lookup).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ClientBuilder {
    config: ClientConfig,
    credentials: Option<Arc<dyn Credentials>>,
    sender: Option<Arc<dyn Sender>>,
    transport: Option<Arc<dyn Sender>>,
    serializer: Arc<dyn Serializer>,
    sleeper: Arc<dyn Sleeper>,
    logger: Arc<dyn RetryLogger>,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            config: ClientConfig::default(),
            credentials: None,
            sender: None,
            transport: None,
            serializer: Arc::new(JsonSerializer),
            sleeper: Arc::new(TokioSleeper),
            logger: Arc::new(TracingRetryLogger),
        }
    }
}

impl fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("config", &self.config)
            .field("has_credentials", &self.credentials.is_some())
            .field("custom_sender", &self.sender.is_some())
            .field("custom_transport", &self.transport.is_some())
            .finish_non_exhaustive()
    }
}

impl ClientBuilder {
    /// Create a builder without credentials
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder that signs with a secret auth id and token
    pub fn with_static_credentials(auth_id: impl Into<String>, auth_token: impl Into<String>) -> Self {
        Self::new().with_credentials(StaticCredentials::new(auth_id, auth_token))
    }

    /// Create a builder that signs with an embedded key bound to `hostname`
    pub fn with_shared_credentials(id: impl Into<String>, hostname: impl Into<String>) -> Self {
        Self::new().with_credentials(SharedCredentials::new(id, hostname))
    }

    /// Create a builder from `SMARTY_*` environment variables
    ///
    /// Requires `SMARTY_AUTH_ID` and `SMARTY_AUTH_TOKEN`; see
    /// [`ClientConfig::from_env`] for the optional settings.
    pub fn from_env() -> ApiResult<Self> {
        let config = ClientConfig::from_env()?;
        let credentials = StaticCredentials::from_env()?;
        Ok(Self::new().with_config(config).with_credentials(credentials))
    }

    /// Current configuration
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Retry failed requests at most `max_retries` times; 0 disables retrying
    #[must_use]
    pub fn retry_at_most(mut self, max_retries: u32) -> Self {
        self.config.retry.max_retries = max_retries;
        self
    }

    /// Set the connect and response timeout
    #[must_use]
    pub fn with_max_timeout(mut self, timeout: Duration) -> Self {
        self.config.max_timeout = timeout;
        self
    }

    /// Replace the whole sender chain
    ///
    /// The sender receives requests with relative URLs and no credentials;
    /// retry, timeout, proxy and URL settings are ignored.
    #[must_use]
    pub fn with_sender<S: Sender + 'static>(mut self, sender: S) -> Self {
        self.sender = Some(Arc::new(sender));
        self
    }

    /// Replace only the innermost transport, keeping the rest of the chain
    #[must_use]
    pub fn with_transport<S: Sender + 'static>(mut self, transport: S) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Replace the JSON serializer
    #[must_use]
    pub fn with_serializer<S: Serializer + 'static>(mut self, serializer: S) -> Self {
        self.serializer = Arc::new(serializer);
        self
    }

    /// Send every request to `url` instead of the family's endpoint
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.config.url_prefix = Some(url.into());
        self
    }

    /// Route requests through an HTTP proxy
    #[must_use]
    pub fn with_proxy(mut self, host: impl Into<String>, port: u16) -> Self {
        self.config.proxy = Some(ProxyConfig::new(host, port));
        self
    }

    /// Trace requests and responses at `debug` level
    #[must_use]
    pub fn with_debug(mut self) -> Self {
        self.config.debug = true;
        self
    }

    /// Sign requests with `credentials`
    #[must_use]
    pub fn with_credentials<C: Credentials + 'static>(mut self, credentials: C) -> Self {
        self.credentials = Some(Arc::new(credentials));
        self
    }

    /// Replace the sleeper used between retries
    #[must_use]
    pub fn with_sleeper<S: Sleeper + 'static>(mut self, sleeper: S) -> Self {
        self.sleeper = Arc::new(sleeper);
        self
    }

    /// Replace the logger that records failed attempts
    #[must_use]
    pub fn with_logger<L: RetryLogger + 'static>(mut self, logger: L) -> Self {
        self.logger = Arc::new(logger);
        self
    }

    /// Set the delay strategy between retries
    #[must_use]
    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.config.retry.backoff = backoff;
        self
    }

    /// Replace the whole configuration
    #[must_use]
    pub fn with_config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Build a client for family `F`
    pub fn build<F: Family>(&self) -> ApiResult<Client<F>> {
        let sender = self.build_sender(F::DEFAULT_URL)?;
        let client = Client::new(sender, Arc::clone(&self.serializer));
        if self.sender.is_some() {
            return Ok(client);
        }
        Ok(client.with_timeout(self.config.max_timeout))
    }

    /// Build a US Street Address API client
    pub fn build_us_street_api_client(&self) -> ApiResult<Client<UsStreet>> {
        self.build()
    }

    /// Build a US ZIP Code API client
    pub fn build_us_zipcode_api_client(&self) -> ApiResult<Client<UsZipCode>> {
        self.build()
    }

    /// Build an International Street Address API client
    pub fn build_international_street_api_client(&self) -> ApiResult<Client<InternationalStreet>> {
        self.build()
    }

    /// Build a US Autocomplete API client
    pub fn build_us_autocomplete_api_client(&self) -> ApiResult<Client<UsAutocomplete>> {
        self.build()
    }

    /// Build a US Extract API client
    pub fn build_us_extract_api_client(&self) -> ApiResult<Client<UsExtract>> {
        self.build()
    }

    fn build_sender(&self, default_url: &str) -> ApiResult<Arc<dyn Sender>> {
        if let Some(sender) = &self.sender {
            return Ok(Arc::clone(sender));
        }

        self.config.validate()?;

        let mut sender: Box<dyn Sender> = match &self.transport {
            Some(transport) => Box::new(Arc::clone(transport)),
            None => Box::new(HttpSender::new(&self.config)?),
        };
        sender = Box::new(StatusSender::new(sender));

        if self.config.retry.max_retries > 0 {
            sender = Box::new(RetrySender::new(
                self.config.retry.clone(),
                sender,
                Arc::clone(&self.sleeper),
                Arc::clone(&self.logger),
            ));
        }

        if let Some(credentials) = &self.credentials {
            sender = Box::new(SigningSender::new(Arc::clone(credentials), sender));
        }

        let url = self.config.resolve_url(default_url);
        debug!(
            url = %url,
            max_retries = self.config.retry.max_retries,
            timeout_ms = u64::try_from(self.config.max_timeout.as_millis()).unwrap_or(u64::MAX),
            signed = self.credentials.is_some(),
            "built sender chain"
        );

        Ok(Arc::new(UrlPrefixSender::new(url, sender)))
    }
}

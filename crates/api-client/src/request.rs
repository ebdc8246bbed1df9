//! Request and response envelopes passed through the sender chain

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Query parameters whose values never appear in logs
const SECRET_PARAMS: [&str; 2] = ["auth-token", "key"];

/// HTTP methods used by the Smarty APIs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// `GET`, lookup carried in the query string
    Get,
    /// `POST`, lookup carried in the body
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Get => "GET",
            Self::Post => "POST",
        })
    }
}

/// Outgoing request
///
/// `url` starts out relative (usually empty) and is resolved against the
/// configured endpoint by the URL prefix sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// HTTP method
    pub method: Method,
    /// Relative path before prefixing, absolute URL after
    pub url: String,
    /// Query parameters
    pub query: BTreeMap<String, String>,
    /// Headers, names lowercased
    pub headers: BTreeMap<String, String>,
    /// Body bytes
    pub payload: Option<Vec<u8>>,
    /// Per-request timeout overriding the transport default
    pub timeout: Option<Duration>,
}

impl Request {
    /// Create a request with an empty relative path
    pub fn new(method: Method) -> Self {
        Self {
            method,
            url: String::new(),
            query: BTreeMap::new(),
            headers: BTreeMap::new(),
            payload: None,
            timeout: None,
        }
    }

    /// Create a `GET` request
    pub fn get() -> Self {
        Self::new(Method::Get)
    }

    /// Create a `POST` request with a body and content type
    pub fn post(payload: Vec<u8>, content_type: &str) -> Self {
        Self::new(Method::Post)
            .with_header("content-type", content_type)
            .with_payload(payload)
    }

    /// Set the relative path appended to the endpoint
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.url = path.into();
        self
    }

    /// Add a header; the name is lowercased
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_header(name, value);
        self
    }

    /// Add a query parameter
    #[must_use]
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_query(name, value);
        self
    }

    /// Add a query parameter when the value is present and not blank
    #[must_use]
    pub fn with_optional_query(mut self, name: &str, value: Option<impl ToString>) -> Self {
        if let Some(value) = value.map(|v| v.to_string()) {
            if !value.trim().is_empty() {
                self.set_query(name, value);
            }
        }
        self
    }

    /// Set the body
    #[must_use]
    pub fn with_payload(mut self, payload: Vec<u8>) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Set a per-request timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Insert or replace a header in place
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
    }

    /// Insert or replace a query parameter in place
    pub fn set_query(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.query.insert(name.into(), value.into());
    }

    /// Header value by case-insensitive name
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Body content type, carried as the `content-type` header
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Full URL including the encoded query string
    #[must_use]
    pub fn full_url(&self) -> String {
        self.render_url(false)
    }

    /// Full URL with credential values masked, safe for logs
    #[must_use]
    pub fn redacted_url(&self) -> String {
        self.render_url(true)
    }

    fn render_url(&self, redact: bool) -> String {
        if self.query.is_empty() {
            return self.url.clone();
        }

        let query = self
            .query
            .iter()
            .map(|(name, value)| {
                let value = if redact && SECRET_PARAMS.contains(&name.as_str()) {
                    "***".to_string()
                } else {
                    urlencoding::encode(value).into_owned()
                };
                format!("{}={value}", urlencoding::encode(name))
            })
            .collect::<Vec<_>>()
            .join("&");

        let separator = if self.url.contains('?') { '&' } else { '?' };
        format!("{}{separator}{query}", self.url)
    }
}

/// Raw response produced by the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// HTTP status code
    pub status: u16,
    /// Body bytes
    pub payload: Vec<u8>,
    /// Headers, names lowercased
    pub headers: BTreeMap<String, String>,
}

impl Response {
    /// Create a response without headers
    pub fn new(status: u16, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            payload: payload.into(),
            headers: BTreeMap::new(),
        }
    }

    /// Add a header; the name is lowercased
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    /// Check for a 2xx status
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Header value by case-insensitive name
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Body decoded as UTF-8, replacing invalid sequences
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }
}

//! Error types for the API client

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Classification of transport-level failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// The request exceeded its timeout
    Timeout,
    /// The connection (including TLS) could not be established
    Connect,
    /// Any other I/O failure while sending or reading the body
    Other,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Timeout => "timeout",
            Self::Connect => "connect",
            Self::Other => "io",
        })
    }
}

/// API client errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// The lookup is empty or fails the family's input rules
    #[error("Invalid lookup: {0}")]
    Precondition(String),

    /// Encoding the lookup or decoding the response failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The credentials could not sign the request
    #[error("Credentials error: {0}")]
    Credentials(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Missing environment variable
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    /// Connection, timeout or TLS failure
    #[error("Transport error ({kind}): {message}")]
    Transport {
        /// Failure class
        kind: TransportErrorKind,
        /// Underlying message
        message: String,
    },

    /// The service answered with a non-2xx status
    #[error("API error ({status}): {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Meaning of the status for this service
        message: String,
        /// Response body as text
        body: String,
        /// Server-provided `Retry-After` hint
        retry_after: Option<Duration>,
    },

    /// All retry attempts exhausted
    #[error("All {attempts} attempts failed: {last}")]
    RetriesExhausted {
        /// Number of attempts made
        attempts: u32,
        /// The final underlying failure
        #[source]
        last: Box<ApiError>,
    },

    /// The response does not line up with the lookups that were sent
    #[error("Data integrity error: {0}")]
    DataIntegrity(String),
}

impl ApiError {
    /// Create a precondition error
    pub fn precondition(msg: impl Into<String>) -> Self {
        Self::Precondition(msg.into())
    }

    /// Create a serialization error
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a missing env var error
    pub fn missing_env(var: impl Into<String>) -> Self {
        Self::MissingEnvVar(var.into())
    }

    /// Create a transport error
    pub fn transport(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self::Transport {
            kind,
            message: message.into(),
        }
    }

    /// Create a status error with the service's meaning for `status`
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: status_message(status).to_string(),
            body: body.into(),
            retry_after: None,
        }
    }

    /// Create a result-count mismatch error
    pub fn result_count_mismatch(expected: usize, actual: usize) -> Self {
        Self::DataIntegrity(format!(
            "expected {expected} result(s) for {expected} lookup(s), received {actual}"
        ))
    }

    /// HTTP status code carried by this error or the failure it wraps
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::RetriesExhausted { last, .. } => last.status_code(),
            _ => None,
        }
    }

    /// Check if this is a client error (4xx)
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status_code()
            .is_some_and(|status| (400..500).contains(&status))
    }

    /// Check if this is a server error (5xx)
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_some_and(|status| status >= 500)
    }

    /// Check if the failure happened below HTTP
    #[must_use]
    pub fn is_transport(&self) -> bool {
        match self {
            Self::Transport { .. } => true,
            Self::RetriesExhausted { last, .. } => last.is_transport(),
            _ => false,
        }
    }

    /// Check if this error was raised before anything was sent
    #[must_use]
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::Precondition(_)
                | Self::Serialization(_)
                | Self::Credentials(_)
                | Self::Config(_)
                | Self::MissingEnvVar(_)
        )
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            TransportErrorKind::Timeout
        } else if err.is_connect() {
            TransportErrorKind::Connect
        } else {
            TransportErrorKind::Other
        };
        Self::transport(kind, err.to_string())
    }
}

/// What a status code means when returned by the Smarty APIs
#[must_use]
pub fn status_message(status: u16) -> &'static str {
    match status {
        400 => "Bad Request (Malformed Payload): the request body was blank or otherwise malformed",
        401 => "Unauthorized: the credentials were provided incorrectly or did not match any existing, active credentials",
        402 => "Payment Required: there is no active subscription for the account associated with the credentials submitted with the request",
        403 => "Forbidden: the request was not permitted for this account or host",
        408 => "Request Timeout: the request took too long to process",
        413 => "Request Entity Too Large: the request body has exceeded the maximum size",
        422 => "Unprocessable Entity: a required field was missing or the input could not be interpreted",
        429 => "Too Many Requests: the rate limit for the plan associated with this account has been exceeded",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable: try again later",
        504 => "Gateway Timeout: the upstream data provider did not respond in a timely fashion",
        _ if (200..300).contains(&status) => "OK",
        _ if (400..500).contains(&status) => "Client Error",
        _ if (500..600).contains(&status) => "Server Error",
        _ => "Unexpected Status",
    }
}

//! Request signing
//!
//! Two kinds of credentials are accepted by the Smarty APIs:
//!
//! | Type | Query parameters | Headers |
//! |------|------------------|---------|
//! | [`StaticCredentials`] | `auth-id`, `auth-token` | none |
//! | [`SharedCredentials`] | `key` | `Referer: https://<hostname>` |
//!
//! Static (secret) credentials belong on servers. Shared (embedded) keys are
//! tied to a hostname and are safe to ship in client-side code.

use crate::error::{ApiError, ApiResult};
use crate::request::Request;
use std::fmt;

/// Environment variable holding the auth id
pub const AUTH_ID_VAR: &str = "SMARTY_AUTH_ID";

/// Environment variable holding the auth token
pub const AUTH_TOKEN_VAR: &str = "SMARTY_AUTH_TOKEN";

/// Signs outgoing requests
///
/// Signing must be deterministic: signing the same request twice yields the
/// same request.
pub trait Credentials: Send + Sync {
    /// Add authentication to `request` in place
    fn sign(&self, request: &mut Request) -> ApiResult<()>;
}

/// Secret auth id and token pair
#[derive(Clone, PartialEq, Eq)]
pub struct StaticCredentials {
    auth_id: String,
    auth_token: String,
}

impl StaticCredentials {
    /// Create credentials from an auth id and token
    pub fn new(auth_id: impl Into<String>, auth_token: impl Into<String>) -> Self {
        Self {
            auth_id: auth_id.into(),
            auth_token: auth_token.into(),
        }
    }

    /// Read `SMARTY_AUTH_ID` and `SMARTY_AUTH_TOKEN` from the environment
    pub fn from_env() -> ApiResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ApiResult<Self> {
        let auth_id = lookup(AUTH_ID_VAR).ok_or_else(|| ApiError::missing_env(AUTH_ID_VAR))?;
        let auth_token =
            lookup(AUTH_TOKEN_VAR).ok_or_else(|| ApiError::missing_env(AUTH_TOKEN_VAR))?;
        Ok(Self::new(auth_id, auth_token))
    }

    /// The auth id
    #[must_use]
    pub fn auth_id(&self) -> &str {
        &self.auth_id
    }
}

impl fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("auth_id", &self.auth_id)
            .field("auth_token", &"***")
            .finish()
    }
}

impl Credentials for StaticCredentials {
    fn sign(&self, request: &mut Request) -> ApiResult<()> {
        if self.auth_id.trim().is_empty() || self.auth_token.trim().is_empty() {
            return Err(ApiError::Credentials(
                "auth-id and auth-token must not be empty".to_string(),
            ));
        }

        request.set_query("auth-id", self.auth_id.as_str());
        request.set_query("auth-token", self.auth_token.as_str());
        Ok(())
    }
}

/// Embedded key bound to the hostname of the calling site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedCredentials {
    id: String,
    hostname: String,
}

impl SharedCredentials {
    /// Create shared credentials from a key and the hostname it is bound to
    pub fn new(id: impl Into<String>, hostname: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            hostname: hostname.into(),
        }
    }

    /// The referer sent with every request
    #[must_use]
    pub fn referer(&self) -> String {
        let host = self.hostname.trim_end_matches('/');
        if host.starts_with("http://") || host.starts_with("https://") {
            host.to_string()
        } else {
            format!("https://{host}")
        }
    }
}

impl Credentials for SharedCredentials {
    fn sign(&self, request: &mut Request) -> ApiResult<()> {
        if self.id.trim().is_empty() {
            return Err(ApiError::Credentials("key must not be empty".to_string()));
        }
        if self.hostname.trim().is_empty() {
            return Err(ApiError::Credentials("hostname must not be empty".to_string()));
        }

        request.set_query("key", self.id.as_str());
        request.set_header("referer", self.referer());
        Ok(())
    }
}

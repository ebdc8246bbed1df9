//! Client for the Smarty address verification APIs
//!
//! This crate sends lookups to the Smarty family of web APIs and attaches the
//! typed results to them.
//!
//! # Features
//!
//! - **One client, five APIs**: US Street, US ZIP Code, International Street,
//!   US Autocomplete and US Extract share a single generic [`Client`]
//! - **Composable sender chain**: URL prefixing, request signing, retry with
//!   backoff and status validation wrap a pooled `reqwest` transport
//! - **Swappable collaborators**: inject your own transport, serializer,
//!   sleeper or retry logger for testing
//! - **Environment-based configuration**: load credentials and settings from
//!   `SMARTY_*` variables
//!
//! # Example
//!
//! ```rust,no_run
//! use smarty_api_client::{ClientBuilder, UsStreetLookup, ZipCodeLookup};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let builder = ClientBuilder::from_env()?.retry_at_most(3);
//!
//!     let street = builder.build_us_street_api_client()?;
//!     let mut lookups = vec![
//!         UsStreetLookup::freeform("1600 Amphitheatre Pkwy, Mountain View, CA"),
//!         UsStreetLookup::new().with_street("1 Rosedale").with_zipcode("21229"),
//!     ];
//!     street.send_batch(&mut lookups).await?;
//!     for lookup in &lookups {
//!         println!("{} candidate(s)", lookup.results.len());
//!     }
//!
//!     let zipcode = builder.build_us_zipcode_api_client()?;
//!     let mut lookup = ZipCodeLookup::city_state("Provo", "UT");
//!     zipcode.send(&mut lookup).await?;
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod builder;
pub mod client;
pub mod config;
pub mod credentials;
pub mod endpoints;
pub mod error;
pub mod request;
pub mod sender;
pub mod serializer;

#[cfg(test)]
mod test_support;

pub use builder::ClientBuilder;
pub use client::{Client, Family};
pub use config::{ClientConfig, ProxyConfig};
pub use credentials::{Credentials, SharedCredentials, StaticCredentials};
pub use endpoints::{
    ExtractLookup, ExtractResult, InternationalLookup, InternationalStreetClient, UsAutocompleteClient,
    UsAutocompleteLookup, UsExtractClient, UsStreetClient, UsStreetLookup, UsZipCodeClient,
    ZipCodeLookup,
};
pub use error::{ApiError, ApiResult, TransportErrorKind};
pub use request::{Method, Request, Response};
pub use sender::Sender;
pub use serializer::{JsonSerializer, Serializer};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::builder::ClientBuilder;
    pub use crate::client::{Client, Family};
    pub use crate::config::{ClientConfig, ProxyConfig};
    pub use crate::credentials::{Credentials, SharedCredentials, StaticCredentials};
    pub use crate::endpoints::{
        Candidate, ExtractLookup, ExtractResult, InternationalCandidate, InternationalLookup,
        Suggestion, UsAutocompleteLookup, UsStreetLookup, ZipCodeLookup, ZipCodeResult,
    };
    pub use crate::error::{ApiError, ApiResult};
    pub use crate::sender::{Backoff, RetryConfig, RetryLogger, Sender, Sleeper};
}

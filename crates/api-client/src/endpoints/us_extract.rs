//! US Extract API
//!
//! Finds and verifies US addresses inside free text. The text is posted as
//! a plain-text body; options travel in the query string.

use super::us_street::Candidate;
use super::{is_blank, require};
use crate::client::{Client, Family};
use crate::error::{ApiError, ApiResult};
use crate::request::{Request, Response};
use crate::serializer::{decode, Serializer};
use serde::{Deserialize, Serialize};

/// Client for the US Extract API
pub type UsExtractClient = Client<UsExtract>;

/// US Extract API family
#[derive(Debug, Clone, Copy)]
pub struct UsExtract;

const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

impl Family for UsExtract {
    const NAME: &'static str = "us_extract";
    const DEFAULT_URL: &'static str = "https://us-extract.api.smartystreets.com";
    const MAX_BATCH_SIZE: usize = 1;

    type Lookup = ExtractLookup;
    type Results = ExtractResult;

    fn validate(lookup: &ExtractLookup) -> ApiResult<()> {
        require(!is_blank(Some(lookup.text.as_str())), "text is required")
    }

    fn encode(lookups: &[ExtractLookup], _serializer: &dyn Serializer) -> ApiResult<Request> {
        let Some(lookup) = lookups.first() else {
            return Ok(Request::get());
        };

        Ok(Request::post(lookup.text.clone().into_bytes(), TEXT_CONTENT_TYPE)
            .with_optional_query("html", lookup.html)
            .with_query("aggressive", lookup.aggressive.to_string())
            .with_query("addr_line_breaks", lookup.addresses_have_line_breaks.to_string())
            .with_optional_query("addr_per_line", lookup.addresses_per_line))
    }

    fn decode(
        _lookups: &[ExtractLookup],
        response: &Response,
        serializer: &dyn Serializer,
    ) -> ApiResult<Vec<ExtractResult>> {
        let result = decode(serializer, &response.payload)?;
        Ok(vec![result])
    }

    fn attach(lookup: &mut ExtractLookup, results: ExtractResult) {
        lookup.result = Some(results);
    }
}

impl Client<UsExtract> {
    /// Extract addresses from `lookup` without modifying it
    pub async fn extract(&self, lookup: &ExtractLookup) -> ApiResult<ExtractResult> {
        self.dispatch(std::slice::from_ref(lookup))
            .await?
            .pop()
            .ok_or_else(|| ApiError::result_count_mismatch(1, 0))
    }
}

// ============================================================================
// Lookup
// ============================================================================

/// Free text to scan for addresses
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractLookup {
    /// Text to scan
    pub text: String,
    /// Whether the text is HTML; `None` lets the service detect it
    pub html: Option<bool>,
    /// Also report addresses that may not be addresses
    pub aggressive: bool,
    /// Addresses may span line breaks
    pub addresses_have_line_breaks: bool,
    /// Limit of addresses per line
    pub addresses_per_line: Option<u32>,
    /// Result attached after a successful send
    pub result: Option<ExtractResult>,
}

impl ExtractLookup {
    /// Scan `text`
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            addresses_have_line_breaks: true,
            ..Self::default()
        }
    }

    /// Declare whether the text is HTML
    #[must_use]
    pub fn with_html(mut self, html: bool) -> Self {
        self.html = Some(html);
        self
    }

    /// Report doubtful matches too
    #[must_use]
    pub fn aggressive(mut self) -> Self {
        self.aggressive = true;
        self
    }

    /// Set whether addresses may span line breaks
    #[must_use]
    pub fn with_line_breaks(mut self, allowed: bool) -> Self {
        self.addresses_have_line_breaks = allowed;
        self
    }

    /// Limit addresses per line
    #[must_use]
    pub fn with_addresses_per_line(mut self, limit: u32) -> Self {
        self.addresses_per_line = Some(limit);
        self
    }
}

// ============================================================================
// Response Types
// ============================================================================

/// Extraction outcome
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractResult {
    #[serde(rename = "meta", default)]
    pub metadata: ExtractMetadata,
    #[serde(default)]
    pub addresses: Vec<ExtractedAddress>,
}

/// Statistics about the scanned text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractMetadata {
    pub lines: u32,
    pub unicode: bool,
    pub address_count: u32,
    pub verified_count: u32,
    pub bytes: u64,
    pub character_count: u64,
}

/// Address found in the text
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedAddress {
    /// The matched text
    pub text: String,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub line: u32,
    #[serde(default)]
    pub start: u64,
    #[serde(default)]
    pub end: u64,
    /// US Street candidates for the matched text
    #[serde(rename = "api_output", default)]
    pub candidates: Vec<Candidate>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Method;
    use crate::sender::Sender;
    use crate::serializer::JsonSerializer;
    use crate::test_support::ScriptedTransport;
    use std::sync::Arc;

    const BODY: &str = r#"{
        "meta": {
            "lines": 2,
            "unicode": false,
            "address_count": 1,
            "verified_count": 1,
            "bytes": 52,
            "character_count": 52
        },
        "addresses": [{
            "text": "1600 Amphitheatre Pkwy Mountain View CA",
            "verified": true,
            "line": 2,
            "start": 13,
            "end": 52,
            "api_output": [{"input_index": 0, "delivery_line_1": "1600 Amphitheatre Pkwy"}]
        }]
    }"#;

    fn client(transport: &Arc<ScriptedTransport>) -> UsExtractClient {
        Client::new(
            Arc::clone(transport) as Arc<dyn Sender>,
            Arc::new(JsonSerializer),
        )
    }

    #[test]
    fn test_encode_posts_plain_text() {
        let lookup = ExtractLookup::new("Meet me at 1 Main St").with_addresses_per_line(2);

        let request = UsExtract::encode(&[lookup], &JsonSerializer).unwrap();

        assert_eq!(request.method, Method::Post);
        assert_eq!(request.header("Content-Type"), Some(TEXT_CONTENT_TYPE));
        assert_eq!(request.payload.as_deref(), Some(b"Meet me at 1 Main St".as_slice()));
        assert_eq!(request.query.get("addr_per_line").map(String::as_str), Some("2"));
        assert_eq!(request.query.get("aggressive").map(String::as_str), Some("false"));
        assert!(!request.query.contains_key("html"));
    }

    #[tokio::test]
    async fn test_extract_returns_result() {
        let transport = Arc::new(ScriptedTransport::ok(200, BODY));
        let lookup = ExtractLookup::new("Visit us at\n1600 Amphitheatre Pkwy Mountain View CA");

        let result = client(&transport).extract(&lookup).await.unwrap();

        assert_eq!(
            result.metadata,
            ExtractMetadata {
                lines: 2,
                unicode: false,
                address_count: 1,
                verified_count: 1,
                bytes: 52,
                character_count: 52,
            }
        );
        assert_eq!(result.addresses.len(), 1);
        assert!(result.addresses[0].verified);
        assert_eq!(
            result.addresses[0].candidates[0].delivery_line_1.as_deref(),
            Some("1600 Amphitheatre Pkwy")
        );
        assert!(lookup.result.is_none());
    }

    #[tokio::test]
    async fn test_send_attaches_result() {
        let transport = Arc::new(ScriptedTransport::ok(200, BODY));
        let mut lookup = ExtractLookup::new("1600 Amphitheatre Pkwy Mountain View CA");

        client(&transport).send(&mut lookup).await.unwrap();

        assert_eq!(lookup.result.map(|r| r.metadata.address_count), Some(1));
    }

    #[tokio::test]
    async fn test_blank_text_makes_no_call() {
        let transport = Arc::new(ScriptedTransport::ok(200, BODY));

        let err = client(&transport).extract(&ExtractLookup::new(" \n")).await.unwrap_err();

        assert!(matches!(err, ApiError::Precondition(_)));
        assert_eq!(transport.calls(), 0);
    }
}

//! US Street Address API
//!
//! Verifies and standardizes US street addresses. Up to 100 lookups are
//! posted as one JSON array; every candidate in the response carries the
//! `input_index` of the lookup it belongs to.

use super::{is_blank, require, JSON_CONTENT_TYPE};
use crate::client::{group_by_index, Client, Family};
use crate::error::ApiResult;
use crate::request::{Request, Response};
use crate::serializer::{decode, encode, Serializer};
use serde::{Deserialize, Serialize};

/// Client for the US Street Address API
pub type UsStreetClient = Client<UsStreet>;

/// US Street Address API family
#[derive(Debug, Clone, Copy)]
pub struct UsStreet;

/// Most candidates the service returns for one lookup
pub const MAX_CANDIDATES: u32 = 10;

impl Family for UsStreet {
    const NAME: &'static str = "us_street";
    const DEFAULT_URL: &'static str = "https://us-street.api.smartystreets.com/street-address";
    const MAX_BATCH_SIZE: usize = 100;

    type Lookup = UsStreetLookup;
    type Results = Vec<Candidate>;

    fn validate(lookup: &UsStreetLookup) -> ApiResult<()> {
        require(
            !is_blank(lookup.street.as_deref())
                || !is_blank(lookup.zipcode.as_deref())
                || !is_blank(lookup.lastline.as_deref()),
            "street, zipcode or lastline is required",
        )?;
        require(
            (1..=MAX_CANDIDATES).contains(&lookup.candidates),
            "candidates must be between 1 and 10",
        )
    }

    fn encode(lookups: &[UsStreetLookup], serializer: &dyn Serializer) -> ApiResult<Request> {
        Ok(Request::post(encode(serializer, lookups)?, JSON_CONTENT_TYPE))
    }

    fn decode(
        lookups: &[UsStreetLookup],
        response: &Response,
        serializer: &dyn Serializer,
    ) -> ApiResult<Vec<Vec<Candidate>>> {
        let candidates: Vec<Candidate> = decode(serializer, &response.payload)?;
        group_by_index(lookups.len(), candidates, |c| c.input_index)
    }

    fn attach(lookup: &mut UsStreetLookup, results: Vec<Candidate>) {
        lookup.results = results;
    }
}

// ============================================================================
// Lookup
// ============================================================================

/// How strictly the service matches input to known addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStrategy {
    /// Only return valid, deliverable addresses
    Strict,
    /// Also return the best guess for addresses that fail validation
    Invalid,
    /// Include non-postal matches (requires a subscription)
    Enhanced,
}

/// Address to verify
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsStreetLookup {
    /// Caller-supplied id echoed back on every candidate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_id: Option<String>,
    /// Street line, or the entire address on one line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    /// Extra street information
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street2: Option<String>,
    /// Apartment or suite
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary: Option<String>,
    /// City name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// State name or abbreviation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// ZIP code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zipcode: Option<String>,
    /// City, state and ZIP code combined
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lastline: Option<String>,
    /// Recipient name or company
    #[serde(skip_serializing_if = "Option::is_none")]
    pub addressee: Option<String>,
    /// Puerto Rico urbanization
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urbanization: Option<String>,
    /// Maximum candidates to return, 1 to 10
    pub candidates: u32,
    /// Matching strategy
    #[serde(rename = "match", skip_serializing_if = "Option::is_none")]
    pub match_strategy: Option<MatchStrategy>,
    /// Candidates attached after a successful send
    #[serde(skip)]
    pub results: Vec<Candidate>,
}

impl Default for UsStreetLookup {
    fn default() -> Self {
        Self {
            input_id: None,
            street: None,
            street2: None,
            secondary: None,
            city: None,
            state: None,
            zipcode: None,
            lastline: None,
            addressee: None,
            urbanization: None,
            candidates: 1,
            match_strategy: None,
            results: Vec::new(),
        }
    }
}

impl UsStreetLookup {
    /// Create an empty lookup
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a lookup from a single-line address
    pub fn freeform(address: impl Into<String>) -> Self {
        Self::new().with_street(address)
    }

    /// Set the input id
    #[must_use]
    pub fn with_input_id(mut self, input_id: impl Into<String>) -> Self {
        self.input_id = Some(input_id.into());
        self
    }

    /// Set the street line
    #[must_use]
    pub fn with_street(mut self, street: impl Into<String>) -> Self {
        self.street = Some(street.into());
        self
    }

    /// Set the secondary designator
    #[must_use]
    pub fn with_secondary(mut self, secondary: impl Into<String>) -> Self {
        self.secondary = Some(secondary.into());
        self
    }

    /// Set city and state
    #[must_use]
    pub fn with_city_state(mut self, city: impl Into<String>, state: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self.state = Some(state.into());
        self
    }

    /// Set the ZIP code
    #[must_use]
    pub fn with_zipcode(mut self, zipcode: impl Into<String>) -> Self {
        self.zipcode = Some(zipcode.into());
        self
    }

    /// Set the last line
    #[must_use]
    pub fn with_lastline(mut self, lastline: impl Into<String>) -> Self {
        self.lastline = Some(lastline.into());
        self
    }

    /// Set the addressee
    #[must_use]
    pub fn with_addressee(mut self, addressee: impl Into<String>) -> Self {
        self.addressee = Some(addressee.into());
        self
    }

    /// Set the maximum number of candidates
    #[must_use]
    pub fn with_candidates(mut self, candidates: u32) -> Self {
        self.candidates = candidates;
        self
    }

    /// Set the match strategy
    #[must_use]
    pub fn with_match(mut self, strategy: MatchStrategy) -> Self {
        self.match_strategy = Some(strategy);
        self
    }
}

// ============================================================================
// Response Types
// ============================================================================

/// One verified address
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub input_id: Option<String>,
    pub input_index: usize,
    #[serde(default)]
    pub candidate_index: usize,
    pub addressee: Option<String>,
    pub delivery_line_1: Option<String>,
    pub delivery_line_2: Option<String>,
    pub last_line: Option<String>,
    pub delivery_point_barcode: Option<String>,
    #[serde(default)]
    pub components: Components,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub analysis: Analysis,
}

/// Parsed address parts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Components {
    pub urbanization: Option<String>,
    pub primary_number: Option<String>,
    pub street_name: Option<String>,
    pub street_predirection: Option<String>,
    pub street_postdirection: Option<String>,
    pub street_suffix: Option<String>,
    pub secondary_number: Option<String>,
    pub secondary_designator: Option<String>,
    pub pmb_designator: Option<String>,
    pub pmb_number: Option<String>,
    pub city_name: Option<String>,
    pub default_city_name: Option<String>,
    pub state_abbreviation: Option<String>,
    pub zipcode: Option<String>,
    pub plus4_code: Option<String>,
    pub delivery_point: Option<String>,
    pub delivery_point_check_digit: Option<String>,
}

/// Location and delivery details
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub record_type: Option<String>,
    pub zip_type: Option<String>,
    pub county_fips: Option<String>,
    pub county_name: Option<String>,
    pub carrier_route: Option<String>,
    pub congressional_district: Option<String>,
    pub rdi: Option<String>,
    pub elot_sequence: Option<String>,
    pub elot_sort: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub precision: Option<String>,
    pub time_zone: Option<String>,
    pub utc_offset: Option<f64>,
    pub dst: Option<bool>,
}

/// Delivery point validation results
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    pub dpv_match_code: Option<String>,
    pub dpv_footnotes: Option<String>,
    pub dpv_cmra: Option<String>,
    pub dpv_vacant: Option<String>,
    pub dpv_no_stat: Option<String>,
    pub active: Option<String>,
    pub footnotes: Option<String>,
    pub lacslink_code: Option<String>,
    pub lacslink_indicator: Option<String>,
    pub suitelink_match: Option<bool>,
    pub enhanced_match: Option<String>,
}

impl Candidate {
    /// Check whether the address is a confirmed delivery point
    #[must_use]
    pub fn is_deliverable(&self) -> bool {
        matches!(self.analysis.dpv_match_code.as_deref(), Some("Y" | "S" | "D"))
    }
}

impl Client<UsStreet> {
    /// Verify a single-line address and return its candidates
    pub async fn verify(&self, address: &str) -> ApiResult<Vec<Candidate>> {
        let mut lookup = UsStreetLookup::freeform(address);
        self.send(&mut lookup).await?;
        Ok(lookup.results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::sender::Sender;
    use crate::serializer::JsonSerializer;
    use crate::test_support::ScriptedTransport;
    use std::sync::Arc;

    const BODY: &str = r#"[
        {
            "input_id": "home",
            "input_index": 0,
            "candidate_index": 0,
            "delivery_line_1": "1600 Amphitheatre Pkwy",
            "last_line": "Mountain View CA 94043-1351",
            "delivery_point_barcode": "940431351000",
            "components": {
                "primary_number": "1600",
                "street_name": "Amphitheatre",
                "street_suffix": "Pkwy",
                "city_name": "Mountain View",
                "state_abbreviation": "CA",
                "zipcode": "94043",
                "plus4_code": "1351"
            },
            "metadata": {
                "record_type": "S",
                "county_name": "Santa Clara",
                "latitude": 37.42357,
                "longitude": -122.08661,
                "precision": "Zip9",
                "dst": true
            },
            "analysis": {"dpv_match_code": "Y", "dpv_footnotes": "AABB", "active": "Y"},
            "unexpected_field": 42
        },
        {
            "input_index": 2,
            "candidate_index": 0,
            "delivery_line_1": "1 Rosedale St",
            "last_line": "Baltimore MD 21229-3737"
        },
        {
            "input_index": 2,
            "candidate_index": 1,
            "delivery_line_1": "1 S Rosedale St",
            "last_line": "Baltimore MD 21229-3739"
        }
    ]"#;

    fn client(transport: &Arc<ScriptedTransport>) -> UsStreetClient {
        Client::new(
            Arc::clone(transport) as Arc<dyn Sender>,
            Arc::new(JsonSerializer),
        )
    }

    #[test]
    fn test_lookup_defaults_to_one_candidate() {
        let lookup = UsStreetLookup::new();
        assert_eq!(lookup.candidates, 1);
        assert!(lookup.results.is_empty());
    }

    #[test]
    fn test_validation() {
        assert!(UsStreet::validate(&UsStreetLookup::new()).is_err());
        assert!(UsStreet::validate(&UsStreetLookup::new().with_street("   ")).is_err());
        assert!(UsStreet::validate(&UsStreetLookup::freeform("1 Main St")).is_ok());
        assert!(UsStreet::validate(&UsStreetLookup::new().with_zipcode("84604")).is_ok());
        assert!(UsStreet::validate(&UsStreetLookup::new().with_lastline("Provo UT")).is_ok());
        assert!(UsStreet::validate(&UsStreetLookup::freeform("1 Main St").with_candidates(0)).is_err());
        assert!(UsStreet::validate(&UsStreetLookup::freeform("1 Main St").with_candidates(11)).is_err());
    }

    #[test]
    fn test_encode_skips_empty_fields() {
        let lookups = [UsStreetLookup::freeform("1 Main St")
            .with_input_id("a")
            .with_match(MatchStrategy::Invalid)];

        let request = UsStreet::encode(&lookups, &JsonSerializer).unwrap();

        assert_eq!(request.header("content-type"), Some(JSON_CONTENT_TYPE));
        let body: serde_json::Value = serde_json::from_slice(&request.payload.unwrap()).unwrap();
        assert_eq!(
            body,
            serde_json::json!([{
                "input_id": "a",
                "street": "1 Main St",
                "candidates": 1,
                "match": "invalid"
            }])
        );
    }

    #[tokio::test]
    async fn test_empty_lookup_makes_no_network_call() {
        let transport = Arc::new(ScriptedTransport::ok(200, BODY));
        let mut lookup = UsStreetLookup::new().with_city_state("Provo", "UT");

        let err = client(&transport).send(&mut lookup).await.unwrap_err();

        assert!(matches!(err, ApiError::Precondition(_)));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_batch_results_match_body() {
        let transport = Arc::new(ScriptedTransport::ok(200, BODY));
        let mut lookups = vec![
            UsStreetLookup::freeform("1600 amphitheatre pkwy 94043").with_input_id("home"),
            UsStreetLookup::freeform("nowhere"),
            UsStreetLookup::freeform("1 rosedale baltimore md").with_candidates(5),
        ];

        client(&transport).send_batch(&mut lookups).await.unwrap();

        let expected: Vec<Candidate> = serde_json::from_str(BODY).unwrap();
        assert_eq!(lookups[0].results, &expected[..1]);
        assert!(lookups[1].results.is_empty());
        assert_eq!(lookups[2].results, &expected[1..]);

        let home = &lookups[0].results[0];
        assert_eq!(home.components.zipcode.as_deref(), Some("94043"));
        assert_eq!(home.metadata.latitude, Some(37.42357));
        assert!(home.is_deliverable());

        let sent = transport.last_request();
        let posted: serde_json::Value = serde_json::from_slice(&sent.payload.unwrap()).unwrap();
        assert_eq!(posted.as_array().map(Vec::len), Some(3));
    }

    #[tokio::test]
    async fn test_empty_candidate_list_is_not_an_error() {
        let transport = Arc::new(ScriptedTransport::ok(200, "[]"));

        let candidates = client(&transport).verify("nowhere").await.unwrap();

        assert!(candidates.is_empty());
    }

    #[tokio::test]
    async fn test_candidate_for_unknown_input_is_rejected() {
        let transport = Arc::new(ScriptedTransport::ok(
            200,
            r#"[{"input_index": 1, "delivery_line_1": "x"}]"#,
        ));
        let mut lookup = UsStreetLookup::freeform("1 Main St");

        let err = client(&transport).send(&mut lookup).await.unwrap_err();

        assert!(matches!(err, ApiError::DataIntegrity(_)));
        assert!(lookup.results.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_body_is_serialization_error() {
        let transport = Arc::new(ScriptedTransport::ok(200, r#"{"error": "nope"}"#));
        let mut lookup = UsStreetLookup::freeform("1 Main St");

        let err = client(&transport).send(&mut lookup).await.unwrap_err();

        assert!(matches!(err, ApiError::Serialization(_)));
    }
}

//! US ZIP Code API
//!
//! Resolves a city/state pair or a ZIP code into the matching cities and ZIP
//! codes. The service answers every input with exactly one result.

use super::{is_blank, require, JSON_CONTENT_TYPE};
use crate::client::{group_by_index, Client, Family};
use crate::error::{ApiError, ApiResult};
use crate::request::{Request, Response};
use crate::serializer::{decode, encode, Serializer};
use serde::{Deserialize, Serialize};

/// Client for the US ZIP Code API
pub type UsZipCodeClient = Client<UsZipCode>;

/// US ZIP Code API family
#[derive(Debug, Clone, Copy)]
pub struct UsZipCode;

impl Family for UsZipCode {
    const NAME: &'static str = "us_zipcode";
    const DEFAULT_URL: &'static str = "https://us-zipcode.api.smartystreets.com/lookup";
    const MAX_BATCH_SIZE: usize = 100;

    type Lookup = ZipCodeLookup;
    type Results = ZipCodeResult;

    fn validate(lookup: &ZipCodeLookup) -> ApiResult<()> {
        let has_zip = !is_blank(lookup.zipcode.as_deref());
        let has_city_state = !is_blank(lookup.city.as_deref()) && !is_blank(lookup.state.as_deref());
        require(has_zip || has_city_state, "zipcode or city and state are required")
    }

    fn encode(lookups: &[ZipCodeLookup], serializer: &dyn Serializer) -> ApiResult<Request> {
        Ok(Request::post(encode(serializer, lookups)?, JSON_CONTENT_TYPE))
    }

    fn decode(
        lookups: &[ZipCodeLookup],
        response: &Response,
        serializer: &dyn Serializer,
    ) -> ApiResult<Vec<ZipCodeResult>> {
        let results: Vec<ZipCodeResult> = decode(serializer, &response.payload)?;
        if results.len() != lookups.len() {
            return Err(ApiError::result_count_mismatch(lookups.len(), results.len()));
        }

        group_by_index(lookups.len(), results, |r| r.input_index)?
            .into_iter()
            .enumerate()
            .map(|(index, mut group)| match group.len() {
                1 => Ok(group.remove(0)),
                n => Err(ApiError::DataIntegrity(format!(
                    "expected one result for input {index}, received {n}"
                ))),
            })
            .collect()
    }

    fn attach(lookup: &mut ZipCodeLookup, results: ZipCodeResult) {
        lookup.result = Some(results);
    }
}

// ============================================================================
// Lookup
// ============================================================================

/// City/state or ZIP code to resolve
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ZipCodeLookup {
    /// Caller-supplied id echoed back on the result
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_id: Option<String>,
    /// City name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// State name or abbreviation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// 5-digit ZIP code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zipcode: Option<String>,
    /// Result attached after a successful send
    #[serde(skip)]
    pub result: Option<ZipCodeResult>,
}

impl ZipCodeLookup {
    /// Look up a ZIP code
    pub fn zipcode(zipcode: impl Into<String>) -> Self {
        Self {
            zipcode: Some(zipcode.into()),
            ..Self::default()
        }
    }

    /// Look up a city and state
    pub fn city_state(city: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            city: Some(city.into()),
            state: Some(state.into()),
            ..Self::default()
        }
    }

    /// Set the input id
    #[must_use]
    pub fn with_input_id(mut self, input_id: impl Into<String>) -> Self {
        self.input_id = Some(input_id.into());
        self
    }
}

// ============================================================================
// Response Types
// ============================================================================

/// Result for one input
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZipCodeResult {
    #[serde(default)]
    pub input_index: usize,
    pub input_id: Option<String>,
    /// Set when the input could not be resolved, e.g. `invalid_zipcode`
    pub status: Option<String>,
    pub reason: Option<String>,
    #[serde(default)]
    pub city_states: Vec<CityState>,
    #[serde(default)]
    pub zipcodes: Vec<ZipCode>,
}

impl ZipCodeResult {
    /// Check whether the input resolved
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.status.is_none() && self.reason.is_none()
    }
}

/// City recognized for a ZIP code
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityState {
    pub city: String,
    pub state_abbreviation: String,
    pub state: String,
    #[serde(default)]
    pub mailable_city: bool,
}

/// ZIP code recognized for a city
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZipCode {
    pub zipcode: String,
    pub zipcode_type: Option<String>,
    pub default_city: Option<String>,
    pub county_fips: Option<String>,
    pub county_name: Option<String>,
    pub state_abbreviation: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub precision: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sender::Sender;
    use crate::serializer::JsonSerializer;
    use crate::test_support::ScriptedTransport;
    use std::sync::Arc;

    fn client(transport: &Arc<ScriptedTransport>) -> UsZipCodeClient {
        Client::new(
            Arc::clone(transport) as Arc<dyn Sender>,
            Arc::new(JsonSerializer),
        )
    }

    fn result(index: usize, zipcode: &str) -> String {
        format!(
            r#"{{"input_index":{index},"city_states":[{{"city":"Provo","state_abbreviation":"UT","state":"Utah","mailable_city":true}}],"zipcodes":[{{"zipcode":"{zipcode}","latitude":40.23,"longitude":-111.66}}]}}"#
        )
    }

    #[test]
    fn test_validation() {
        assert!(UsZipCode::validate(&ZipCodeLookup::default()).is_err());
        assert!(UsZipCode::validate(&ZipCodeLookup::zipcode("")).is_err());
        assert!(UsZipCode::validate(&ZipCodeLookup {
            city: Some("Provo".into()),
            ..ZipCodeLookup::default()
        })
        .is_err());
        assert!(UsZipCode::validate(&ZipCodeLookup::zipcode("84604")).is_ok());
        assert!(UsZipCode::validate(&ZipCodeLookup::city_state("Provo", "UT")).is_ok());
    }

    #[tokio::test]
    async fn test_results_attach_by_input_index() {
        let body = format!("[{},{}]", result(1, "84606"), result(0, "84604"));
        let transport = Arc::new(ScriptedTransport::ok(200, &body));
        let mut lookups = vec![
            ZipCodeLookup::zipcode("84604"),
            ZipCodeLookup::city_state("Provo", "UT"),
        ];

        client(&transport).send_batch(&mut lookups).await.unwrap();

        let first = lookups[0].result.as_ref().unwrap();
        assert_eq!(first.zipcodes[0].zipcode, "84604");
        assert!(first.is_valid());
        assert_eq!(first.city_states[0].state, "Utah");
        let second = lookups[1].result.as_ref().unwrap();
        assert_eq!(second.zipcodes[0].zipcode, "84606");
    }

    #[tokio::test]
    async fn test_short_response_is_integrity_error() {
        let body = format!("[{},{}]", result(0, "84604"), result(1, "84606"));
        let transport = Arc::new(ScriptedTransport::ok(200, &body));
        let mut lookups = vec![
            ZipCodeLookup::zipcode("84604"),
            ZipCodeLookup::zipcode("84606"),
            ZipCodeLookup::zipcode("84601"),
        ];

        let err = client(&transport).send_batch(&mut lookups).await.unwrap_err();

        assert!(matches!(err, ApiError::DataIntegrity(_)));
        assert!(lookups.iter().all(|l| l.result.is_none()));
    }

    #[tokio::test]
    async fn test_duplicate_index_is_integrity_error() {
        let body = format!("[{},{}]", result(0, "84604"), result(0, "84606"));
        let transport = Arc::new(ScriptedTransport::ok(200, &body));
        let mut lookups = vec![ZipCodeLookup::zipcode("84604"), ZipCodeLookup::zipcode("84606")];

        let err = client(&transport).send_batch(&mut lookups).await.unwrap_err();

        assert!(matches!(err, ApiError::DataIntegrity(_)));
    }

    #[tokio::test]
    async fn test_invalid_input_reports_status() {
        let transport = Arc::new(ScriptedTransport::ok(
            200,
            r#"[{"input_index":0,"status":"invalid_zipcode","reason":"Invalid ZIP Code."}]"#,
        ));
        let mut lookup = ZipCodeLookup::zipcode("00000");

        client(&transport).send(&mut lookup).await.unwrap();

        let result = lookup.result.unwrap();
        assert!(!result.is_valid());
        assert_eq!(result.status.as_deref(), Some("invalid_zipcode"));
        assert!(result.zipcodes.is_empty());
    }
}

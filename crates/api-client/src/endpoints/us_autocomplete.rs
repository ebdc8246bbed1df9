//! US Autocomplete API
//!
//! Suggests complete addresses for a partially typed one.

use super::{is_blank, require};
use crate::client::{Client, Family};
use crate::error::ApiResult;
use crate::request::{Request, Response};
use crate::serializer::{decode, Serializer};
use serde::{Deserialize, Serialize};

/// Client for the US Autocomplete API
pub type UsAutocompleteClient = Client<UsAutocomplete>;

/// US Autocomplete API family
#[derive(Debug, Clone, Copy)]
pub struct UsAutocomplete;

/// Most suggestions the service returns
pub const MAX_SUGGESTIONS: u32 = 10;

impl Family for UsAutocomplete {
    const NAME: &'static str = "us_autocomplete";
    const DEFAULT_URL: &'static str = "https://us-autocomplete.api.smartystreets.com/suggest";
    const MAX_BATCH_SIZE: usize = 1;

    type Lookup = UsAutocompleteLookup;
    type Results = Vec<Suggestion>;

    fn validate(lookup: &UsAutocompleteLookup) -> ApiResult<()> {
        require(!is_blank(Some(lookup.prefix.as_str())), "prefix is required")?;
        require(
            (1..=MAX_SUGGESTIONS).contains(&lookup.max_suggestions),
            "max_suggestions must be between 1 and 10",
        )
    }

    fn encode(lookups: &[UsAutocompleteLookup], _serializer: &dyn Serializer) -> ApiResult<Request> {
        let Some(lookup) = lookups.first() else {
            return Ok(Request::get());
        };

        let mut request = Request::get()
            .with_query("prefix", lookup.prefix.as_str())
            .with_query("suggestions", lookup.max_suggestions.to_string())
            .with_optional_query("city_filter", join(&lookup.city_filter))
            .with_optional_query("state_filter", join(&lookup.state_filter))
            .with_optional_query("prefer", join(&lookup.prefer));

        request = match lookup.geolocate {
            Geolocate::None => request.with_query("geolocate", "false"),
            Geolocate::City => request
                .with_query("geolocate", "true")
                .with_query("geolocate_precision", "city"),
            Geolocate::State => request
                .with_query("geolocate", "true")
                .with_query("geolocate_precision", "state"),
        };

        Ok(request)
    }

    fn decode(
        _lookups: &[UsAutocompleteLookup],
        response: &Response,
        serializer: &dyn Serializer,
    ) -> ApiResult<Vec<Vec<Suggestion>>> {
        let body: AutocompleteResponse = decode(serializer, &response.payload)?;
        Ok(vec![body.suggestions.unwrap_or_default()])
    }

    fn attach(lookup: &mut UsAutocompleteLookup, results: Vec<Suggestion>) {
        lookup.results = results;
    }
}

fn join(values: &[String]) -> Option<String> {
    (!values.is_empty()).then(|| values.join(","))
}

// ============================================================================
// Lookup
// ============================================================================

/// Biases suggestions toward the caller's location, derived from their IP
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Geolocate {
    /// No location bias
    None,
    /// Prefer the caller's city
    #[default]
    City,
    /// Prefer the caller's state
    State,
}

/// Partial address to complete
#[derive(Debug, Clone, PartialEq)]
pub struct UsAutocompleteLookup {
    /// What the user has typed so far
    pub prefix: String,
    /// Number of suggestions to return, 1 to 10
    pub max_suggestions: u32,
    /// Only suggest addresses in these cities
    pub city_filter: Vec<String>,
    /// Only suggest addresses in these states
    pub state_filter: Vec<String>,
    /// Rank these cities or states first
    pub prefer: Vec<String>,
    pub geolocate: Geolocate,
    /// Suggestions attached after a successful send
    pub results: Vec<Suggestion>,
}

impl UsAutocompleteLookup {
    /// Complete `prefix`
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            max_suggestions: MAX_SUGGESTIONS,
            city_filter: Vec::new(),
            state_filter: Vec::new(),
            prefer: Vec::new(),
            geolocate: Geolocate::default(),
            results: Vec::new(),
        }
    }

    /// Set the number of suggestions
    #[must_use]
    pub fn with_max_suggestions(mut self, max: u32) -> Self {
        self.max_suggestions = max;
        self
    }

    /// Restrict suggestions to a city
    #[must_use]
    pub fn with_city_filter(mut self, city: impl Into<String>) -> Self {
        self.city_filter.push(city.into());
        self
    }

    /// Restrict suggestions to a state
    #[must_use]
    pub fn with_state_filter(mut self, state: impl Into<String>) -> Self {
        self.state_filter.push(state.into());
        self
    }

    /// Rank a city or state first
    #[must_use]
    pub fn with_prefer(mut self, preference: impl Into<String>) -> Self {
        self.prefer.push(preference.into());
        self
    }

    /// Set the location bias
    #[must_use]
    pub fn with_geolocate(mut self, geolocate: Geolocate) -> Self {
        self.geolocate = geolocate;
        self
    }
}

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct AutocompleteResponse {
    #[serde(default)]
    suggestions: Option<Vec<Suggestion>>,
}

/// One suggested address
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Full suggestion text
    pub text: String,
    pub street_line: String,
    pub city: String,
    pub state: String,
}

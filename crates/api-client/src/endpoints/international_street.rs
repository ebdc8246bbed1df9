//! International Street Address API
//!
//! Verifies addresses outside the US. One lookup per request, carried in the
//! query string.

use super::{is_blank, require};
use crate::client::{Client, Family};
use crate::error::ApiResult;
use crate::request::{Request, Response};
use crate::serializer::{decode, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Client for the International Street Address API
pub type InternationalStreetClient = Client<InternationalStreet>;

/// International Street Address API family
#[derive(Debug, Clone, Copy)]
pub struct InternationalStreet;

impl Family for InternationalStreet {
    const NAME: &'static str = "international_street";
    const DEFAULT_URL: &'static str = "https://international-street.api.smartystreets.com/verify";
    const MAX_BATCH_SIZE: usize = 1;

    type Lookup = InternationalLookup;
    type Results = Vec<InternationalCandidate>;

    fn validate(lookup: &InternationalLookup) -> ApiResult<()> {
        require(!is_blank(lookup.country.as_deref()), "country is required")?;

        if !is_blank(lookup.freeform.as_deref()) {
            return Ok(());
        }

        require(
            !is_blank(lookup.address1.as_deref()),
            "freeform or address1 is required",
        )?;
        let has_locality = !is_blank(lookup.locality.as_deref())
            && !is_blank(lookup.administrative_area.as_deref());
        require(
            has_locality || !is_blank(lookup.postal_code.as_deref()),
            "address1 requires locality and administrative_area, or postal_code",
        )
    }

    fn encode(lookups: &[InternationalLookup], _serializer: &dyn Serializer) -> ApiResult<Request> {
        let Some(lookup) = lookups.first() else {
            return Ok(Request::get());
        };

        Ok(Request::get()
            .with_optional_query("input_id", lookup.input_id.as_deref())
            .with_optional_query("country", lookup.country.as_deref())
            .with_optional_query("freeform", lookup.freeform.as_deref())
            .with_optional_query("address1", lookup.address1.as_deref())
            .with_optional_query("address2", lookup.address2.as_deref())
            .with_optional_query("address3", lookup.address3.as_deref())
            .with_optional_query("address4", lookup.address4.as_deref())
            .with_optional_query("organization", lookup.organization.as_deref())
            .with_optional_query("locality", lookup.locality.as_deref())
            .with_optional_query("administrative_area", lookup.administrative_area.as_deref())
            .with_optional_query("postal_code", lookup.postal_code.as_deref())
            .with_optional_query("geocode", lookup.geocode.then_some("true"))
            .with_optional_query("language", lookup.language))
    }

    fn decode(
        _lookups: &[InternationalLookup],
        response: &Response,
        serializer: &dyn Serializer,
    ) -> ApiResult<Vec<Vec<InternationalCandidate>>> {
        let candidates = decode(serializer, &response.payload)?;
        Ok(vec![candidates])
    }

    fn attach(lookup: &mut InternationalLookup, results: Vec<InternationalCandidate>) {
        lookup.results = results;
    }
}

// ============================================================================
// Lookup
// ============================================================================

/// Output script for verified addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    /// The country's native script
    Native,
    /// Latin transliteration
    Latin,
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Native => "native",
            Self::Latin => "latin",
        })
    }
}

/// Address to verify
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InternationalLookup {
    pub input_id: Option<String>,
    /// Country name or ISO code
    pub country: Option<String>,
    /// Entire address in one field
    pub freeform: Option<String>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub address3: Option<String>,
    pub address4: Option<String>,
    pub organization: Option<String>,
    /// City or town
    pub locality: Option<String>,
    /// State or province
    pub administrative_area: Option<String>,
    pub postal_code: Option<String>,
    /// Request coordinates
    pub geocode: bool,
    pub language: Option<Language>,
    /// Candidates attached after a successful send
    pub results: Vec<InternationalCandidate>,
}

impl InternationalLookup {
    /// Look up a single-line address
    pub fn freeform(country: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            country: Some(country.into()),
            freeform: Some(address.into()),
            ..Self::default()
        }
    }

    /// Look up a structured address
    pub fn structured(country: impl Into<String>, address1: impl Into<String>) -> Self {
        Self {
            country: Some(country.into()),
            address1: Some(address1.into()),
            ..Self::default()
        }
    }

    /// Set locality and administrative area
    #[must_use]
    pub fn with_locality(mut self, locality: impl Into<String>, area: impl Into<String>) -> Self {
        self.locality = Some(locality.into());
        self.administrative_area = Some(area.into());
        self
    }

    /// Set the postal code
    #[must_use]
    pub fn with_postal_code(mut self, postal_code: impl Into<String>) -> Self {
        self.postal_code = Some(postal_code.into());
        self
    }

    /// Request coordinates
    #[must_use]
    pub fn with_geocode(mut self) -> Self {
        self.geocode = true;
        self
    }

    /// Set the output language
    #[must_use]
    pub fn with_language(mut self, language: Language) -> Self {
        self.language = Some(language);
        self
    }
}

// ============================================================================
// Response Types
// ============================================================================

/// One verified international address
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InternationalCandidate {
    pub input_id: Option<String>,
    pub organization: Option<String>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub address3: Option<String>,
    pub address4: Option<String>,
    pub address5: Option<String>,
    pub address6: Option<String>,
    #[serde(default)]
    pub components: InternationalComponents,
    #[serde(default)]
    pub metadata: InternationalMetadata,
    #[serde(default)]
    pub analysis: InternationalAnalysis,
}

/// Parsed address parts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InternationalComponents {
    pub country_iso_3: Option<String>,
    pub super_administrative_area: Option<String>,
    pub administrative_area: Option<String>,
    pub sub_administrative_area: Option<String>,
    pub dependent_locality: Option<String>,
    pub locality: Option<String>,
    pub postal_code: Option<String>,
    pub postal_code_short: Option<String>,
    pub postal_code_extra: Option<String>,
    pub thoroughfare: Option<String>,
    pub premise: Option<String>,
    pub premise_number: Option<String>,
    pub sub_building: Option<String>,
}

/// Geocode details
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InternationalMetadata {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub geocode_precision: Option<String>,
    pub max_geocode_precision: Option<String>,
    pub address_format: Option<String>,
}

/// Verification outcome
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InternationalAnalysis {
    /// `Verified`, `Partial`, `Ambiguous` or `None`
    pub verification_status: Option<String>,
    pub address_precision: Option<String>,
    pub max_address_precision: Option<String>,
}

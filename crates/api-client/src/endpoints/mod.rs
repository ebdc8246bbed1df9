//! API family implementations
//!
//! Each module provides the lookup and result types for one Smarty API and
//! the [`Family`](crate::client::Family) strategy that plugs them into the
//! generic client.
//!
//! ## Mapping to Smarty APIs
//!
//! | Module | Endpoint | Method | Batch |
//! |--------|----------|--------|-------|
//! | `us_street` | `us-street.api.smartystreets.com/street-address` | POST JSON | 100 |
//! | `us_zipcode` | `us-zipcode.api.smartystreets.com/lookup` | POST JSON | 100 |
//! | `international_street` | `international-street.api.smartystreets.com/verify` | GET | 1 |
//! | `us_autocomplete` | `us-autocomplete.api.smartystreets.com/suggest` | GET | 1 |
//! | `us_extract` | `us-extract.api.smartystreets.com` | POST text | 1 |

pub mod international_street;
pub mod us_autocomplete;
pub mod us_extract;
pub mod us_street;
pub mod us_zipcode;

pub use international_street::{
    InternationalStreet, InternationalStreetClient, InternationalCandidate, InternationalLookup,
};
pub use us_autocomplete::{Suggestion, UsAutocomplete, UsAutocompleteClient, UsAutocompleteLookup};
pub use us_extract::{ExtractLookup, ExtractResult, UsExtract, UsExtractClient};
pub use us_street::{Candidate, UsStreet, UsStreetClient, UsStreetLookup};
pub use us_zipcode::{UsZipCode, UsZipCodeClient, ZipCodeLookup, ZipCodeResult};

pub(crate) const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

pub(crate) fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

pub(crate) fn require(present: bool, message: &str) -> crate::error::ApiResult<()> {
    if present {
        Ok(())
    } else {
        Err(crate::error::ApiError::precondition(message))
    }
}

//! Reserved dimension keys.
//!
//! Cube rows aggregated across a dimension carry a sentinel key instead of
//! NULL, and placeholder dimension rows use a sentinel for descriptive
//! attributes. Sentinel rows are legitimate, permanent dimension rows.

use crate::model::{CountryDimension, RiskDimension};

/// Risk id for cube rows aggregated across all risks.
pub const ALL_RISKS_ID: i32 = 0;

/// Country code for cube rows aggregated across all countries.
pub const ALL_COUNTRIES_CODE: &str = "W";

/// Country code assigned to ASN placeholders whose fact rows carry no
/// usable country of their own.
pub const UNASSIGNED_COUNTRY_CODE: &str = "ZZ";

/// Descriptive-attribute value for placeholder dimension rows.
pub const UNKNOWN: &str = "unknown";

/// Dimension row backing the all-risks sentinel, required before foreign
/// keys can be applied to the cubes.
pub fn all_risks_row() -> RiskDimension {
    RiskDimension {
        id: ALL_RISKS_ID,
        slug: "all-risks".to_string(),
        title: "All risks".to_string(),
        is_archived: false,
        taxonomy: String::new(),
        measurement_units: String::new(),
        amplification_factor: 0.0,
        description: String::new(),
    }
}

/// Dimension row backing the all-countries sentinel.
pub fn all_countries_row() -> CountryDimension {
    CountryDimension {
        id: ALL_COUNTRIES_CODE.to_string(),
        name: "All countries".to_string(),
        slug: "all-countries".to_string(),
        region: String::new(),
        continent: String::new(),
    }
}

//! Row types shared across the warehouse and the relational store.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::sentinel;

/// A single raw scan observation as staged into the warehouse.
///
/// Loaded per run, never mutated, discarded after aggregation. Duplicates
/// are expected at this stage; the aggregation engine removes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    pub date: DateTime<Utc>,
    pub ip: String,
    pub risk: i32,
    /// Absent ASN is preserved as its own group, never dropped.
    pub asn: Option<i64>,
    pub country: String,
}

/// One row of the daily fact table: distinct source IPs per
/// (day, risk, country, asn).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyFact {
    pub date: NaiveDate,
    pub risk: i32,
    pub country: String,
    pub asn: Option<i64>,
    /// Distinct source IPs observed for this key on this day, not the raw
    /// event count.
    pub count: i64,
    /// `count * amplification_factor(risk)`; 0 until the weighter runs.
    pub count_amplified: f64,
}

/// One row of a rollup cube: counts summed across ASN at a coarser time
/// granularity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollupRow {
    /// Period start date for the cube's granularity.
    pub date: NaiveDate,
    pub risk: i32,
    pub country: String,
    pub count: i64,
    pub count_amplified: f64,
}

/// Risk catalog row. Reloaded wholesale each run; never partially updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskDimension {
    pub id: i32,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default)]
    pub taxonomy: String,
    #[serde(default)]
    pub measurement_units: String,
    pub amplification_factor: f64,
    #[serde(default)]
    pub description: String,
}

/// Country catalog row, keyed by ISO 3166 alpha-2 code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryDimension {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub continent: String,
}

impl CountryDimension {
    /// Permanent placeholder for a country code observed in fact data but
    /// absent from the catalog.
    pub fn placeholder(code: &str) -> Self {
        Self {
            id: code.to_string(),
            name: sentinel::UNKNOWN.to_string(),
            slug: sentinel::UNKNOWN.to_string(),
            region: sentinel::UNKNOWN.to_string(),
            continent: sentinel::UNKNOWN.to_string(),
        }
    }
}

/// ASN catalog row, keyed by AS number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AsnDimension {
    pub number: i64,
    pub title: String,
    #[serde(default)]
    pub country: String,
}

impl AsnDimension {
    /// Permanent placeholder for an AS number observed in fact data but
    /// absent from the catalog. Falls back to the reserved unassigned
    /// country code when the fact row carries no country of its own.
    pub fn placeholder(number: i64, country: Option<&str>) -> Self {
        Self {
            number,
            title: sentinel::UNKNOWN.to_string(),
            country: country
                .unwrap_or(sentinel::UNASSIGNED_COUNTRY_CODE)
                .to_string(),
        }
    }
}

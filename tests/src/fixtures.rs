//! Fixture data for the end-to-end tests.
//!
//! The raw events cover one ISO week (2016-09-26 Monday through
//! 2016-09-28 Wednesday) so weekly rollups are easy to reason about:
//! one group of 2 distinct IPs and one group of 3, with a duplicate
//! observation thrown in to exercise deduplication.

use chrono::{DateTime, Utc};

use pipeline_core::{
    AsnDimension, CatalogRef, CountryDimension, RawEvent, RiskDimension, RunParams,
};

pub const OPEN_NTP: i32 = 2;
pub const NTP_AMPLIFICATION: f64 = 556.9;

fn ts(s: &str) -> DateTime<Utc> {
    s.parse().unwrap()
}

fn event(date: &str, ip: &str, risk: i32, asn: Option<i64>, country: &str) -> RawEvent {
    RawEvent {
        date: ts(date),
        ip: ip.to_string(),
        risk,
        asn,
        country: country.to_string(),
    }
}

/// Five observations, four distinct IPs within their day groups:
/// (2016-09-28, openntp, US, AS64500) sees 2 distinct IPs and
/// (2016-09-26, openntp, LV, AS64501) sees 3.
pub fn raw_events() -> Vec<RawEvent> {
    vec![
        event("2016-09-28T00:15:00Z", "203.0.113.1", OPEN_NTP, Some(64500), "US"),
        // Same IP later the same day: a duplicate for daily counting
        event("2016-09-28T17:40:00Z", "203.0.113.1", OPEN_NTP, Some(64500), "US"),
        event("2016-09-28T09:00:00Z", "203.0.113.2", OPEN_NTP, Some(64500), "US"),
        event("2016-09-26T02:00:00Z", "198.51.100.1", OPEN_NTP, Some(64501), "LV"),
        event("2016-09-26T03:00:00Z", "198.51.100.2", OPEN_NTP, Some(64501), "LV"),
        event("2016-09-26T04:00:00Z", "198.51.100.3", OPEN_NTP, Some(64501), "LV"),
    ]
}

pub fn risk_catalog() -> Vec<RiskDimension> {
    vec![
        RiskDimension {
            id: 1,
            slug: "opendns".to_string(),
            title: "Open DNS".to_string(),
            is_archived: false,
            taxonomy: "amplifier".to_string(),
            measurement_units: "count".to_string(),
            amplification_factor: 28.7,
            description: "Open recursive DNS resolvers".to_string(),
        },
        RiskDimension {
            id: OPEN_NTP,
            slug: "openntp".to_string(),
            title: "Open NTP".to_string(),
            is_archived: false,
            taxonomy: "amplifier".to_string(),
            measurement_units: "count".to_string(),
            amplification_factor: NTP_AMPLIFICATION,
            description: "Open NTP servers".to_string(),
        },
    ]
}

pub fn country_catalog() -> Vec<CountryDimension> {
    vec![
        CountryDimension {
            id: "US".to_string(),
            name: "United States".to_string(),
            slug: "united-states".to_string(),
            region: "Northern America".to_string(),
            continent: "NA".to_string(),
        },
        CountryDimension {
            id: "LV".to_string(),
            name: "Latvia".to_string(),
            slug: "latvia".to_string(),
            region: "Northern Europe".to_string(),
            continent: "EU".to_string(),
        },
    ]
}

/// AS64500 is cataloged; AS64501 is deliberately absent so reconciliation
/// has a placeholder to create.
pub fn asn_catalog() -> Vec<AsnDimension> {
    vec![AsnDimension {
        number: 64500,
        title: "Example Networks".to_string(),
        country: "US".to_string(),
    }]
}

pub fn datapackage_descriptor() -> &'static str {
    r#"{"name": "enriched_scan_data", "resources": [
        {"name": "openntp", "format": "csv", "compression": "gz",
         "path": ["ntp-scan/ntp-scan.20160926.csv.gz"]}
    ]}"#
}

pub fn run_params() -> RunParams {
    RunParams {
        source_path: "clean/latest".to_string(),
        dest_path: "stats/latest".to_string(),
        inventory: ["risk", "country", "asn"]
            .iter()
            .map(|name| CatalogRef {
                name: name.to_string(),
                url: format!("https://ref.example.org/{name}/datapackage.json"),
            })
            .collect(),
        min_distinct_ips: Some(0),
        skip_finalize: false,
    }
}

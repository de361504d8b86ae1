//! Set-based warehouse transformations, as typed operations.
//!
//! Each transformation is a fixed statement over the closed set of staging
//! tables; run-dependent values are bound parameters, except where the
//! engine's bulk loader/unloader dialect only accepts literals inside the
//! statement text (manifest URL, credentials, destination prefix).

/// Deduplicating daily aggregation with low-signal suppression.
///
/// The inner DISTINCT collapses repeat observations of the same IP within
/// a day; the outer GROUP BY then counts distinct IPs per
/// (day, risk, country, asn). Groups whose distinct-IP count does not
/// exceed the bound threshold ($1) are suppressed so singleton/noise ASNs
/// never reach public statistics. NULL ASNs survive as their own group.
/// Output order is fixed for deterministic unloads.
pub const AGGREGATE_DAILY: &str = r#"
INSERT INTO daily_count
(SELECT
    date, risk, country, asn, count(*) AS count, 0 AS count_amplified
FROM (
    SELECT DISTINCT ip, date_trunc('day', date) AS date, risk, asn, country
    FROM log_entry
) AS daily
GROUP BY date, asn, risk, country
HAVING count(*) > $1
ORDER BY date DESC, country ASC, asn ASC, risk ASC)
"#;

/// Amplification weighting: `count_amplified = count * amplification_factor`
/// joined on risk id. Rows with no matching dimension row are left at their
/// default of 0 rather than failing the join.
pub const APPLY_AMPLIFICATION: &str = r#"
UPDATE daily_count
SET count_amplified = count * amplification_factor
FROM dim_risk WHERE risk = id
"#;

/// Risk catalog staging insert. The description is bound empty: it is long
/// and nothing in the warehouse reads it.
pub const STAGE_RISK: &str = r#"
INSERT INTO dim_risk VALUES ($1, $2, $3, $4, $5)
"#;

/// Manifest-driven bulk load of raw events: gzip-compressed delimited
/// input, header row skipped, auto timestamp format, all listed files
/// mandatory.
#[derive(Debug, Clone)]
pub struct BulkLoad<'a> {
    pub manifest_url: &'a str,
    pub credentials: &'a str,
}

impl BulkLoad<'_> {
    pub fn sql(&self) -> String {
        format!(
            "COPY log_entry FROM '{}'\n\
             CREDENTIALS '{}'\n\
             IGNOREHEADER AS 1\n\
             DELIMITER ',' gzip\n\
             TIMEFORMAT AS 'auto'\n\
             MANIFEST",
            self.manifest_url, self.credentials
        )
    }
}

/// Bulk unload of the daily counts to object storage: delimited,
/// overwrite allowed, single output stream so the bridge has exactly one
/// part file to rename.
#[derive(Debug, Clone)]
pub struct Unload<'a> {
    pub dest_url: &'a str,
    pub credentials: &'a str,
}

impl Unload<'_> {
    pub fn sql(&self) -> String {
        format!(
            "UNLOAD('SELECT * FROM daily_count')\n\
             TO '{}'\n\
             CREDENTIALS '{}'\n\
             DELIMITER AS ','\n\
             ALLOWOVERWRITE\n\
             PARALLEL OFF",
            self.dest_url, self.credentials
        )
    }
}

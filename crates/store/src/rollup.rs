//! Rollup cube construction.
//!
//! Each cube aggregates the daily fact table to one calendar granularity,
//! with CUBE grouping over (country, risk) so every period also carries
//! all-countries and all-risks subtotal rows. The period column is always
//! the truncated period start, never NULL, so a period's subtotal rows sum
//! exactly to its detail rows.

use pipeline_core::sentinel::{ALL_COUNTRIES_CODE, ALL_RISKS_ID};
use pipeline_core::Granularity;

/// Cube build statement for one granularity.
pub fn build_cube_sql(granularity: Granularity) -> String {
    format!(
        "INSERT INTO {table}\n\
         (SELECT\n\
         \x20   date_trunc('{g}', date)::date AS date,\n\
         \x20   risk, country,\n\
         \x20   sum(count) AS count,\n\
         \x20   sum(count_amplified) AS count_amplified\n\
         FROM fact_count\n\
         GROUP BY date_trunc('{g}', date), CUBE(country, risk)\n\
         ORDER BY date DESC, country ASC, risk ASC)",
        table = granularity.cube_table(),
        g = granularity.as_str(),
    )
}

/// Rewrite of the subtotal rows' NULL risk key to the all-risks sentinel.
/// The sentinel id is bound ($1).
pub fn normalize_risk_sql(granularity: Granularity) -> String {
    format!(
        "UPDATE {} SET risk = $1 WHERE risk IS NULL",
        granularity.cube_table()
    )
}

/// Rewrite of the subtotal rows' NULL country key to the all-countries
/// sentinel. The sentinel code is bound ($1).
pub fn normalize_country_sql(granularity: Granularity) -> String {
    format!(
        "UPDATE {} SET country = $1 WHERE country IS NULL",
        granularity.cube_table()
    )
}

/// Distinct dates across the fact table and every cube, for the date
/// dimension. Cube period starts are included so cube rows can carry a
/// date foreign key too.
pub fn dimension_dates_sql() -> String {
    let mut sql = String::from("SELECT DISTINCT date FROM fact_count");
    for granularity in Granularity::ALL {
        sql.push_str(&format!(
            " UNION SELECT DISTINCT date FROM {}",
            granularity.cube_table()
        ));
    }
    sql.push_str(" ORDER BY date");
    sql
}

/// Sanity re-export: normalization binds these sentinels.
pub const NULL_RISK_SENTINEL: i32 = ALL_RISKS_ID;
pub const NULL_COUNTRY_SENTINEL: &str = ALL_COUNTRIES_CODE;

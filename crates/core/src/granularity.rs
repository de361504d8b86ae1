//! Rollup time granularities.

use std::fmt;

use chrono::{Datelike, NaiveDate, Weekday};

/// Time granularities the cube builder produces from the daily fact table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Granularity {
    Week,
    Month,
    Quarter,
    Year,
}

impl Granularity {
    /// All granularities, in build order.
    pub const ALL: [Granularity; 4] = [
        Granularity::Week,
        Granularity::Month,
        Granularity::Quarter,
        Granularity::Year,
    ];

    /// Name used in `date_trunc` and table suffixes.
    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Week => "week",
            Granularity::Month => "month",
            Granularity::Quarter => "quarter",
            Granularity::Year => "year",
        }
    }

    /// Cube table for this granularity. Closed set; safe to interpolate
    /// into statements.
    pub fn cube_table(&self) -> &'static str {
        match self {
            Granularity::Week => "agg_risk_country_week",
            Granularity::Month => "agg_risk_country_month",
            Granularity::Quarter => "agg_risk_country_quarter",
            Granularity::Year => "agg_risk_country_year",
        }
    }

    /// Period start for a date, matching the engine's `date_trunc`
    /// semantics (ISO week starting Monday).
    pub fn truncate(&self, date: NaiveDate) -> NaiveDate {
        match self {
            Granularity::Week => {
                let back = date.weekday().num_days_from_monday() as i64;
                date - chrono::Duration::days(back)
            }
            Granularity::Month => {
                NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap()
            }
            Granularity::Quarter => {
                let month = ((date.month() - 1) / 3) * 3 + 1;
                NaiveDate::from_ymd_opt(date.year(), month, 1).unwrap()
            }
            Granularity::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap(),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//! Calendar decomposition for the date dimension.
//!
//! The date dimension is regenerated each run from the dates actually
//! present in the fact table and the cubes, so it only ever contains dates
//! with data. Attributes follow the engine's EXTRACT/date_trunc semantics:
//! ISO week numbers, weeks starting on Monday.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::Granularity;

/// One row of the date dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRow {
    pub date: NaiveDate,
    pub month: u32,
    pub year: i32,
    pub quarter: u32,
    /// ISO week number. Near year boundaries this can belong to the
    /// adjacent ISO year while `year` stays the calendar year.
    pub week: u32,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
}

/// Decompose a fact date into its date-dimension attributes.
pub fn date_attributes(date: NaiveDate) -> DateRow {
    let week_start = Granularity::Week.truncate(date);
    DateRow {
        date,
        month: date.month(),
        year: date.year(),
        quarter: (date.month() - 1) / 3 + 1,
        week: date.iso_week().week(),
        week_start,
        week_end: week_start + Duration::days(6),
    }
}

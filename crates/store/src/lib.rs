//! Relational store client for the stats pipeline.
//!
//! The store serves the reporting API: the fact table bridged over from
//! the warehouse, the dimension tables, the rollup cubes, and the
//! constraints and indexes applied once the data is stable.

pub mod client;
pub mod config;
pub mod finalize;
pub mod rollup;
pub mod schema;

pub use client::StoreClient;
pub use config::StoreConfig;

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::NaiveDate;

use pipeline_core::{
    AsnDimension, CountryDimension, DateRow, Granularity, Result, RiskDimension,
};

/// Seam between the run orchestration and the relational store.
///
/// Production uses [`StoreClient`]; tests substitute an in-memory store.
#[async_trait]
pub trait StatsStore: Send + Sync {
    /// Drop and recreate every destination table.
    async fn rebuild_schema(&self) -> Result<()>;

    /// Bulk copy of unloaded daily counts into the fact table. Empty
    /// fields are nulls. Returns rows copied.
    async fn copy_fact_counts(&self, csv: &[u8]) -> Result<u64>;

    /// Replace-insert rows into `dim_risk`.
    async fn insert_risks(&self, rows: &[RiskDimension]) -> Result<u64>;

    /// Replace-insert rows into `dim_country`.
    async fn insert_countries(&self, rows: &[CountryDimension]) -> Result<u64>;

    /// Replace-insert rows into `dim_asn`.
    async fn insert_asns(&self, rows: &[AsnDimension]) -> Result<u64>;

    /// Build one rollup cube from the fact table. Returns rows written.
    async fn build_cube(&self, granularity: Granularity) -> Result<u64>;

    /// Map NULL risk/country keys in a cube to their sentinel ids. Returns
    /// rows rewritten.
    async fn normalize_cube_sentinels(&self, granularity: Granularity) -> Result<u64>;

    /// Distinct dates across the fact table and every cube; input to the
    /// date dimension.
    async fn collect_dimension_dates(&self) -> Result<Vec<NaiveDate>>;

    /// Populate the date dimension.
    async fn insert_date_rows(&self, rows: &[DateRow]) -> Result<u64>;

    /// Distinct country codes referenced by fact rows.
    async fn fact_country_codes(&self) -> Result<Vec<String>>;

    /// Country codes present in the dimension table.
    async fn dimension_country_codes(&self) -> Result<HashSet<String>>;

    /// Distinct (asn, country) pairs referenced by fact rows, NULL ASNs
    /// excluded, in deterministic order for first-write-wins planning.
    async fn fact_asn_pairs(&self) -> Result<Vec<(i64, Option<String>)>>;

    /// AS numbers present in the dimension table.
    async fn dimension_asns(&self) -> Result<HashSet<i64>>;

    /// Apply primary and foreign keys. Fails hard if any fact or cube row
    /// still references a missing dimension key.
    async fn apply_constraints(&self) -> Result<()>;

    /// Create the reporting API's access-pattern indexes.
    async fn create_indexes(&self) -> Result<()>;
}

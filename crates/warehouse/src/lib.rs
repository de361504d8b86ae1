//! Warehouse engine client for the stats pipeline.
//!
//! The warehouse holds the per-run staging tables and executes the
//! set-based aggregation and weighting transformations before the result
//! is bridged to the relational store.

pub mod client;
pub mod config;
pub mod ops;
pub mod schema;

pub use client::WarehouseClient;
pub use config::WarehouseConfig;

use async_trait::async_trait;
use pipeline_core::{Result, RiskDimension};

/// Seam between the run orchestration and the warehouse engine.
///
/// Production uses [`WarehouseClient`]; tests substitute an in-memory
/// engine.
#[async_trait]
pub trait WarehouseEngine: Send + Sync {
    /// Drop and recreate the per-run staging tables.
    async fn rebuild_schema(&self) -> Result<()>;

    /// Manifest-driven bulk load of raw events into the staging table.
    async fn load_raw_events(&self, manifest_url: &str) -> Result<()>;

    /// Stage the risk catalog, replace semantics. Descriptions are blanked;
    /// only the amplification factor is consumed here. Returns rows staged.
    async fn stage_risk_catalog(&self, risks: &[RiskDimension]) -> Result<u64>;

    /// Deduplicate raw events into daily distinct-IP counts, suppressing
    /// groups at or below the threshold. Returns rows written.
    async fn aggregate_daily(&self, min_distinct_ips: u32) -> Result<u64>;

    /// Weight daily counts by per-risk amplification factors. Returns rows
    /// updated; rows with no matching risk keep their default of 0.
    async fn apply_amplification(&self) -> Result<u64>;

    /// Unload the daily counts to the destination prefix as a single
    /// delimited stream.
    async fn unload_daily_counts(&self, dest_url: &str) -> Result<()>;
}

//! Warehouse staging-table schemas.
//!
//! All three tables are dropped and recreated at the start of every run;
//! there is no incremental mode. A failed run leaves whatever it leaves,
//! and the next run's rebuild cleans it up.

use tracing::info;

use crate::client::WarehouseClient;
use pipeline_core::{Error, Result};

/// Raw scan events as delivered by the bulk loader. No uniqueness
/// constraint; duplicates are expected and removed by aggregation.
pub const CREATE_LOG_ENTRY: &str = r#"
CREATE TABLE log_entry (
    date TIMESTAMP,
    ip VARCHAR(32),
    risk INT,
    asn BIGINT,
    country VARCHAR(2)
)
"#;

/// Risk catalog staging table. Only the amplification factor is consumed
/// in the warehouse.
pub const CREATE_DIM_RISK: &str = r#"
CREATE TABLE dim_risk (
    id INT,
    slug VARCHAR(32),
    title VARCHAR(64),
    amplification_factor DOUBLE PRECISION,
    description TEXT
)
"#;

/// Daily fact table: one row per (day, risk, country, asn) with the
/// distinct-IP count and the amplification-weighted count.
pub const CREATE_DAILY_COUNT: &str = r#"
CREATE TABLE daily_count (
    date TIMESTAMP,
    risk INT,
    country VARCHAR(2),
    asn BIGINT,
    count INT,
    count_amplified DOUBLE PRECISION
)
"#;

/// Per-run staging tables, in drop order.
pub const STAGING_TABLES: &[&str] = &["dim_risk", "log_entry", "daily_count"];

/// Drop and recreate the staging tables.
pub async fn rebuild_schema(client: &WarehouseClient) -> Result<()> {
    for table in STAGING_TABLES {
        let sql = format!("DROP TABLE IF EXISTS {table} CASCADE");
        sqlx::query(&sql)
            .execute(client.pool())
            .await
            .map_err(|e| Error::warehouse(format!("drop {table}: {e}")))?;
    }

    for sql in [CREATE_DIM_RISK, CREATE_LOG_ENTRY, CREATE_DAILY_COUNT] {
        sqlx::query(sql)
            .execute(client.pool())
            .await
            .map_err(|e| Error::warehouse(format!("create staging table: {e}")))?;
    }

    info!("Warehouse staging tables rebuilt");
    Ok(())
}

//! Destination-table schemas for the relational store.
//!
//! Tables are created bare and constrained only after every load and
//! reconciliation step has finished, so bulk copies and cube builds never
//! fight referential checks mid-run.

use tracing::info;

use crate::client::StoreClient;
use pipeline_core::{Error, Granularity, Result};

/// Daily fact table bridged over from the warehouse unload.
pub const CREATE_FACT_COUNT: &str = r#"
CREATE TABLE fact_count (
    date DATE,
    risk INT,
    country VARCHAR(2),
    asn BIGINT,
    count BIGINT,
    count_amplified DOUBLE PRECISION
)
"#;

/// Full risk catalog, description included; the reporting API serves it.
pub const CREATE_DIM_RISK: &str = r#"
CREATE TABLE dim_risk (
    id INT,
    slug VARCHAR(32),
    title VARCHAR(64),
    is_archived BOOLEAN DEFAULT FALSE,
    taxonomy VARCHAR(32),
    measurement_units VARCHAR(32),
    amplification_factor DOUBLE PRECISION,
    description TEXT
)
"#;

pub const CREATE_DIM_COUNTRY: &str = r#"
CREATE TABLE dim_country (
    id VARCHAR(2),
    name VARCHAR(128),
    slug VARCHAR(128),
    region VARCHAR(64),
    continent VARCHAR(32)
)
"#;

pub const CREATE_DIM_ASN: &str = r#"
CREATE TABLE dim_asn (
    number BIGINT,
    title VARCHAR(255),
    country VARCHAR(2)
)
"#;

/// Calendar attributes for every date the fact table or any cube
/// references.
pub const CREATE_DIM_TIME: &str = r#"
CREATE TABLE dim_time (
    date DATE,
    month INT,
    year INT,
    quarter INT,
    week INT,
    week_start DATE,
    week_end DATE
)
"#;

/// Every destination table, in drop order. Cubes first so fact/dim drops
/// never trip over cube foreign keys on a finalized schema.
pub fn destination_tables() -> Vec<String> {
    let mut tables: Vec<String> = Granularity::ALL
        .iter()
        .map(|g| g.cube_table().to_string())
        .collect();
    tables.extend(
        ["fact_count", "dim_time", "dim_asn", "dim_country", "dim_risk"]
            .iter()
            .map(|t| t.to_string()),
    );
    tables
}

fn create_cube_sql(granularity: Granularity) -> String {
    format!(
        "CREATE TABLE {} (\n\
         \x20   date DATE,\n\
         \x20   risk INT,\n\
         \x20   country VARCHAR(2),\n\
         \x20   count BIGINT,\n\
         \x20   count_amplified DOUBLE PRECISION\n\
         )",
        granularity.cube_table()
    )
}

/// Drop and recreate every destination table.
pub async fn rebuild_schema(client: &StoreClient) -> Result<()> {
    for table in destination_tables() {
        let sql = format!("DROP TABLE IF EXISTS {table} CASCADE");
        sqlx::query(&sql)
            .execute(client.pool())
            .await
            .map_err(|e| Error::store(format!("drop {table}: {e}")))?;
    }

    let fixed = [
        CREATE_DIM_RISK,
        CREATE_DIM_COUNTRY,
        CREATE_DIM_ASN,
        CREATE_DIM_TIME,
        CREATE_FACT_COUNT,
    ];
    for sql in fixed {
        sqlx::query(sql)
            .execute(client.pool())
            .await
            .map_err(|e| Error::store(format!("create destination table: {e}")))?;
    }
    for granularity in Granularity::ALL {
        let sql = create_cube_sql(granularity);
        sqlx::query(&sql)
            .execute(client.pool())
            .await
            .map_err(|e| Error::store(format!("create {}: {e}", granularity.cube_table())))?;
    }

    info!("Store destination tables rebuilt");
    Ok(())
}

//! Store client wrapper.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::postgres::{PgPoolCopyExt, PgPoolOptions};
use sqlx::PgPool;
use tracing::{debug, info};

use crate::config::StoreConfig;
use crate::{finalize, rollup, schema, StatsStore};
use pipeline_core::{
    AsnDimension, CountryDimension, DateRow, Error, Granularity, Result, RiskDimension,
};

/// Bulk copy target for the unloaded daily counts. Empty fields become
/// nulls so unset ASNs survive the bridge.
const COPY_FACT_COUNT: &str = "COPY fact_count FROM STDIN WITH (FORMAT csv, NULL '')";

const INSERT_RISK: &str = r#"
INSERT INTO dim_risk VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
"#;

const INSERT_COUNTRY: &str = r#"
INSERT INTO dim_country VALUES ($1, $2, $3, $4, $5)
"#;

const INSERT_ASN: &str = r#"
INSERT INTO dim_asn VALUES ($1, $2, $3)
"#;

const INSERT_DATE: &str = r#"
INSERT INTO dim_time VALUES ($1, $2, $3, $4, $5, $6, $7)
"#;

/// Relational store client with connection pooling.
#[derive(Clone)]
pub struct StoreClient {
    pool: PgPool,
    config: StoreConfig,
}

impl StoreClient {
    /// Connect to the store.
    pub async fn connect(config: StoreConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.pool_size)
            .connect(&config.url)
            .await
            .map_err(|e| Error::store(format!("connect: {e}")))?;

        info!(pool_size = config.pool_size, "Connected to store");

        Ok(Self { pool, config })
    }

    /// Returns the underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Returns the configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }
}

#[async_trait]
impl StatsStore for StoreClient {
    async fn rebuild_schema(&self) -> Result<()> {
        schema::rebuild_schema(self).await
    }

    async fn copy_fact_counts(&self, csv: &[u8]) -> Result<u64> {
        let mut copy = self
            .pool
            .copy_in_raw(COPY_FACT_COUNT)
            .await
            .map_err(|e| Error::store(format!("copy begin: {e}")))?;
        copy.send(csv)
            .await
            .map_err(|e| Error::store(format!("copy send: {e}")))?;
        let rows = copy
            .finish()
            .await
            .map_err(|e| Error::store(format!("copy finish: {e}")))?;

        info!(rows, "Fact counts copied");
        Ok(rows)
    }

    async fn insert_risks(&self, rows: &[RiskDimension]) -> Result<u64> {
        for risk in rows {
            sqlx::query(INSERT_RISK)
                .bind(risk.id)
                .bind(&risk.slug)
                .bind(&risk.title)
                .bind(risk.is_archived)
                .bind(&risk.taxonomy)
                .bind(&risk.measurement_units)
                .bind(risk.amplification_factor)
                .bind(&risk.description)
                .execute(&self.pool)
                .await
                .map_err(|e| Error::store(format!("insert risk {}: {e}", risk.id)))?;
        }
        debug!(rows = rows.len(), "Risk dimension loaded");
        Ok(rows.len() as u64)
    }

    async fn insert_countries(&self, rows: &[CountryDimension]) -> Result<u64> {
        for country in rows {
            sqlx::query(INSERT_COUNTRY)
                .bind(&country.id)
                .bind(&country.name)
                .bind(&country.slug)
                .bind(&country.region)
                .bind(&country.continent)
                .execute(&self.pool)
                .await
                .map_err(|e| Error::store(format!("insert country {}: {e}", country.id)))?;
        }
        debug!(rows = rows.len(), "Country dimension loaded");
        Ok(rows.len() as u64)
    }

    async fn insert_asns(&self, rows: &[AsnDimension]) -> Result<u64> {
        for asn in rows {
            sqlx::query(INSERT_ASN)
                .bind(asn.number)
                .bind(&asn.title)
                .bind(&asn.country)
                .execute(&self.pool)
                .await
                .map_err(|e| Error::store(format!("insert asn {}: {e}", asn.number)))?;
        }
        debug!(rows = rows.len(), "ASN dimension loaded");
        Ok(rows.len() as u64)
    }

    async fn build_cube(&self, granularity: Granularity) -> Result<u64> {
        let sql = rollup::build_cube_sql(granularity);
        let result = sqlx::query(&sql)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::store(format!("build {}: {e}", granularity.cube_table())))?;
        Ok(result.rows_affected())
    }

    async fn normalize_cube_sentinels(&self, granularity: Granularity) -> Result<u64> {
        let risks = sqlx::query(&rollup::normalize_risk_sql(granularity))
            .bind(rollup::NULL_RISK_SENTINEL)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::store(format!("normalize {} risk: {e}", granularity)))?;
        let countries = sqlx::query(&rollup::normalize_country_sql(granularity))
            .bind(rollup::NULL_COUNTRY_SENTINEL)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::store(format!("normalize {} country: {e}", granularity)))?;
        Ok(risks.rows_affected() + countries.rows_affected())
    }

    async fn collect_dimension_dates(&self) -> Result<Vec<NaiveDate>> {
        let sql = rollup::dimension_dates_sql();
        sqlx::query_scalar::<_, NaiveDate>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Error::store(format!("dimension dates: {e}")))
    }

    async fn insert_date_rows(&self, rows: &[DateRow]) -> Result<u64> {
        for row in rows {
            sqlx::query(INSERT_DATE)
                .bind(row.date)
                .bind(row.month as i32)
                .bind(row.year)
                .bind(row.quarter as i32)
                .bind(row.week as i32)
                .bind(row.week_start)
                .bind(row.week_end)
                .execute(&self.pool)
                .await
                .map_err(|e| Error::store(format!("insert date {}: {e}", row.date)))?;
        }
        debug!(rows = rows.len(), "Date dimension loaded");
        Ok(rows.len() as u64)
    }

    async fn fact_country_codes(&self) -> Result<Vec<String>> {
        sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT country FROM fact_count WHERE country IS NOT NULL ORDER BY country",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::store(format!("fact countries: {e}")))
    }

    async fn dimension_country_codes(&self) -> Result<HashSet<String>> {
        let codes = sqlx::query_scalar::<_, String>("SELECT id FROM dim_country")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Error::store(format!("dimension countries: {e}")))?;
        Ok(codes.into_iter().collect())
    }

    async fn fact_asn_pairs(&self) -> Result<Vec<(i64, Option<String>)>> {
        sqlx::query_as::<_, (i64, Option<String>)>(
            "SELECT DISTINCT asn, country FROM fact_count \
             WHERE asn IS NOT NULL ORDER BY asn, country",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::store(format!("fact asns: {e}")))
    }

    async fn dimension_asns(&self) -> Result<HashSet<i64>> {
        let numbers = sqlx::query_scalar::<_, i64>("SELECT number FROM dim_asn")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Error::store(format!("dimension asns: {e}")))?;
        Ok(numbers.into_iter().collect())
    }

    async fn apply_constraints(&self) -> Result<()> {
        for sql in finalize::constraint_statements() {
            sqlx::query(&sql)
                .execute(&self.pool)
                .await
                .map_err(|e| Error::constraint(format!("{sql}: {e}")))?;
        }
        info!("Store constraints applied");
        Ok(())
    }

    async fn create_indexes(&self) -> Result<()> {
        for sql in finalize::index_statements() {
            sqlx::query(&sql)
                .execute(&self.pool)
                .await
                .map_err(|e| Error::store(format!("{sql}: {e}")))?;
        }
        info!("Store indexes created");
        Ok(())
    }
}

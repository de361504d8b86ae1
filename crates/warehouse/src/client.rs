//! Warehouse client wrapper.

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{debug, info};

use crate::config::WarehouseConfig;
use crate::{ops, schema, WarehouseEngine};
use pipeline_core::{Error, Result, RiskDimension};

/// Warehouse client with connection pooling. Connections are scoped to the
/// client object and passed into each stage; there is no ambient global
/// connection state.
#[derive(Clone)]
pub struct WarehouseClient {
    pool: PgPool,
    config: WarehouseConfig,
}

impl WarehouseClient {
    /// Connect to the warehouse.
    pub async fn connect(config: WarehouseConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.pool_size)
            .connect(&config.url)
            .await
            .map_err(|e| Error::warehouse(format!("connect: {e}")))?;

        info!(pool_size = config.pool_size, "Connected to warehouse");

        Ok(Self { pool, config })
    }

    /// Returns the underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Returns the configuration.
    pub fn config(&self) -> &WarehouseConfig {
        &self.config
    }
}

#[async_trait]
impl WarehouseEngine for WarehouseClient {
    async fn rebuild_schema(&self) -> Result<()> {
        schema::rebuild_schema(self).await
    }

    async fn load_raw_events(&self, manifest_url: &str) -> Result<()> {
        let load = ops::BulkLoad {
            manifest_url,
            credentials: &self.config.load_role,
        };
        sqlx::query(&load.sql())
            .execute(&self.pool)
            .await
            .map_err(|e| Error::warehouse(format!("bulk load: {e}")))?;

        info!(manifest = manifest_url, "Raw events loaded");
        Ok(())
    }

    async fn stage_risk_catalog(&self, risks: &[RiskDimension]) -> Result<u64> {
        for risk in risks {
            sqlx::query(ops::STAGE_RISK)
                .bind(risk.id)
                .bind(&risk.slug)
                .bind(&risk.title)
                .bind(risk.amplification_factor)
                .bind("")
                .execute(&self.pool)
                .await
                .map_err(|e| Error::warehouse(format!("stage risk {}: {e}", risk.id)))?;
        }
        debug!(risks = risks.len(), "Risk catalog staged");
        Ok(risks.len() as u64)
    }

    async fn aggregate_daily(&self, min_distinct_ips: u32) -> Result<u64> {
        let result = sqlx::query(ops::AGGREGATE_DAILY)
            .bind(min_distinct_ips as i64)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::warehouse(format!("aggregate: {e}")))?;
        Ok(result.rows_affected())
    }

    async fn apply_amplification(&self) -> Result<u64> {
        let result = sqlx::query(ops::APPLY_AMPLIFICATION)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::warehouse(format!("amplification: {e}")))?;
        Ok(result.rows_affected())
    }

    async fn unload_daily_counts(&self, dest_url: &str) -> Result<()> {
        let unload = ops::Unload {
            dest_url,
            credentials: &self.config.load_role,
        };
        sqlx::query(&unload.sql())
            .execute(&self.pool)
            .await
            .map_err(|e| Error::warehouse(format!("unload: {e}")))?;

        info!(dest = dest_url, "Daily counts unloaded");
        Ok(())
    }
}

//! Batch pipeline binary: raw scan logs in, finalized statistics store
//! out.

use std::sync::Arc;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use pipeline::{FsBlobStore, HttpCatalogSource, Pipeline};
use pipeline_core::RunParams;
use store_client::{StoreClient, StoreConfig};
use warehouse_client::{WarehouseClient, WarehouseConfig};

/// Full application configuration: engine connections plus the run
/// parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Config {
    #[serde(default)]
    warehouse: WarehouseConfig,
    #[serde(default)]
    store: StoreConfig,
    #[serde(default)]
    run: RunParams,
    /// Root directory backing object storage for local runs.
    #[serde(default = "default_blob_root")]
    blob_root: String,
}

fn default_blob_root() -> String {
    "data/blobs".to_string()
}

/// Layered configuration: built-in defaults, then `config/default.toml`,
/// then `SCANSTATS__`-prefixed environment variables, then a few short
/// env aliases for the values operators set most.
fn load_config() -> anyhow::Result<Config> {
    let defaults = Config::default();

    let mut builder = config::Config::builder()
        .add_source(config::Config::try_from(&defaults)?)
        .add_source(config::File::with_name("config/default").required(false))
        .add_source(
            config::Environment::with_prefix("SCANSTATS")
                .separator("__")
                .try_parsing(true),
        );

    if let Ok(url) = std::env::var("SCANSTATS_WAREHOUSE_URL") {
        builder = builder.set_override("warehouse.url", url)?;
    }
    if let Ok(url) = std::env::var("SCANSTATS_STORE_URL") {
        builder = builder.set_override("store.url", url)?;
    }
    if let Ok(threshold) = std::env::var("SCANSTATS_MIN_DISTINCT_IPS") {
        let threshold: u32 = threshold
            .parse()
            .context("SCANSTATS_MIN_DISTINCT_IPS must be an integer")?;
        builder = builder.set_override("run.min_distinct_ips", threshold as i64)?;
    }

    let config = builder.build()?.try_deserialize()?;
    Ok(config)
}

async fn run(config: Config) -> anyhow::Result<()> {
    config
        .run
        .validate()
        .context("invalid run configuration")?;

    let warehouse = WarehouseClient::connect(config.warehouse)
        .await
        .context("warehouse connection failed")?;
    let store = StoreClient::connect(config.store)
        .await
        .context("store connection failed")?;
    let blobs = FsBlobStore::new(&config.blob_root);

    // Catalog URLs are present after validate().
    let catalog = |name: &str| {
        config
            .run
            .catalog_url(name)
            .unwrap_or_default()
            .to_string()
    };
    let catalogs = HttpCatalogSource::new(catalog("risk"), catalog("country"), catalog("asn"));

    let pipeline = Pipeline::new(
        config.run,
        Arc::new(warehouse),
        Arc::new(store),
        Arc::new(blobs),
        Arc::new(catalogs),
    );

    let report = pipeline.run().await?;
    info!(
        state = %report.state,
        facts_loaded = report.facts_loaded,
        placeholder_countries = report.placeholder_countries,
        placeholder_asns = report.placeholder_asns,
        skipped_asn_conflicts = report.skipped_asn_conflicts,
        "Pipeline run finished"
    );
    Ok(())
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    telemetry::init_tracing_from_env();

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Failed to load configuration");
            std::process::exit(1);
        }
    };

    if let Err(e) = run(config).await {
        error!(error = %e, "Pipeline run failed");
        std::process::exit(1);
    }
}

//! The run orchestrator: drives the warehouse, the relational store,
//! object storage, and the reference catalogs through one full rebuild.

use std::sync::Arc;

use tracing::{info, warn};

use pipeline_core::reconcile::{plan_asns, plan_countries};
use pipeline_core::{date_attributes, object_key, sentinel, Granularity, Manifest, Result, RunParams};
use store_client::StatsStore;
use telemetry::StageTimer;
use warehouse_client::WarehouseEngine;

use crate::state::RunState;
use crate::storage::BlobStore;
use crate::CatalogSource;

/// Outcome of one full run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Last state the run completed.
    pub state: RunState,
    /// Daily fact rows bridged into the store.
    pub facts_loaded: u64,
    /// Placeholder country rows created during reconciliation.
    pub placeholder_countries: usize,
    /// Placeholder ASN rows created during reconciliation.
    pub placeholder_asns: usize,
    /// ASN pairs skipped because a conflicting country was already chosen.
    pub skipped_asn_conflicts: usize,
}

/// One pipeline run over fixed engines. Engines come in behind trait
/// objects so tests can substitute in-memory implementations.
pub struct Pipeline {
    params: RunParams,
    warehouse: Arc<dyn WarehouseEngine>,
    store: Arc<dyn StatsStore>,
    blobs: Arc<dyn BlobStore>,
    catalogs: Arc<dyn CatalogSource>,
}

impl Pipeline {
    pub fn new(
        params: RunParams,
        warehouse: Arc<dyn WarehouseEngine>,
        store: Arc<dyn StatsStore>,
        blobs: Arc<dyn BlobStore>,
        catalogs: Arc<dyn CatalogSource>,
    ) -> Self {
        Self {
            params,
            warehouse,
            store,
            blobs,
            catalogs,
        }
    }

    /// Run the full stage sequence. Every run rebuilds both engines from
    /// scratch; a failure aborts with the last completed state logged.
    pub async fn run(&self) -> Result<RunReport> {
        self.params.validate()?;
        let mut state = RunState::Empty;
        info!(state = %state, "Run starting");

        self.stage_reference().await?;
        state = advance(state);

        let timer = StageTimer::start("aggregate");
        let daily_rows = self
            .warehouse
            .aggregate_daily(self.params.threshold())
            .await?;
        timer.finish(daily_rows);
        state = advance(state);

        let timer = StageTimer::start("weight");
        let weighted = self.warehouse.apply_amplification().await?;
        timer.finish(weighted);
        state = advance(state);

        let facts_loaded = self.stage_rollup().await?;
        state = advance(state);

        let (placeholder_countries, placeholder_asns, skipped_asn_conflicts) =
            self.stage_reconcile().await?;
        state = advance(state);

        if self.params.skip_finalize {
            info!(state = %state, "Finalization skipped by configuration");
        } else {
            let timer = StageTimer::start("constrain");
            self.store.apply_constraints().await?;
            timer.finish_silent();
            state = advance(state);

            let timer = StageTimer::start("index");
            self.store.create_indexes().await?;
            timer.finish_silent();
            state = advance(state);
        }

        info!(state = %state, facts_loaded, "Run complete");
        Ok(RunReport {
            state,
            facts_loaded,
            placeholder_countries,
            placeholder_asns,
            skipped_asn_conflicts,
        })
    }

    /// Rebuild both engines, stage the raw events, and load the reference
    /// catalogs plus the reserved subtotal rows.
    async fn stage_reference(&self) -> Result<()> {
        let timer = StageTimer::start("reference");

        let descriptor_key = object_key(&self.params.source_path, "datapackage.json");
        let descriptor = self.blobs.get(&descriptor_key).await?;
        let descriptor = String::from_utf8_lossy(&descriptor);
        let manifest = Manifest::from_datapackage(&descriptor, &self.params.source_path)?;

        let manifest_key = object_key(&self.params.source_path, "clean.manifest");
        self.blobs
            .put(&manifest_key, &serde_json::to_vec(&manifest)?)
            .await?;
        info!(
            manifest = %manifest_key,
            files = manifest.entries.len(),
            "Bulk-load manifest written"
        );

        self.warehouse.rebuild_schema().await?;
        self.warehouse.load_raw_events(&manifest_key).await?;

        let risks = self.catalogs.fetch_risks().await?;
        let countries = self.catalogs.fetch_countries().await?;
        let asns = self.catalogs.fetch_asns().await?;

        self.warehouse.stage_risk_catalog(&risks).await?;

        self.store.rebuild_schema().await?;
        self.store.insert_risks(&risks).await?;
        self.store.insert_risks(&[sentinel::all_risks_row()]).await?;
        self.store.insert_countries(&countries).await?;
        self.store
            .insert_countries(&[sentinel::all_countries_row()])
            .await?;
        self.store.insert_asns(&asns).await?;

        timer.finish_silent();
        Ok(())
    }

    /// Bridge the daily counts out of the warehouse, build the cubes, and
    /// populate the date dimension over everything that now holds a date.
    async fn stage_rollup(&self) -> Result<u64> {
        let timer = StageTimer::start("rollup");

        let dest = object_key(&self.params.dest_path, "count");
        self.warehouse.unload_daily_counts(&dest).await?;

        // The single-stream unload writes exactly one part file.
        let part_key = format!("{dest}000");
        let csv_key = format!("{dest}.csv");
        self.blobs.copy(&part_key, &csv_key).await?;
        self.blobs.delete(&part_key).await?;

        let csv = self.blobs.get(&csv_key).await?;
        let facts_loaded = self.store.copy_fact_counts(&csv).await?;

        for granularity in Granularity::ALL {
            let rows = self.store.build_cube(granularity).await?;
            let rewritten = self.store.normalize_cube_sentinels(granularity).await?;
            info!(
                cube = granularity.cube_table(),
                rows, rewritten, "Cube built"
            );
        }

        let dates = self.store.collect_dimension_dates().await?;
        let rows: Vec<_> = dates.iter().map(|d| date_attributes(*d)).collect();
        self.store.insert_date_rows(&rows).await?;

        timer.finish(facts_loaded);
        Ok(facts_loaded)
    }

    /// Close the dimensions over every key the facts reference. Countries
    /// first, so ASN placeholders never point at a missing country.
    async fn stage_reconcile(&self) -> Result<(usize, usize, usize)> {
        let timer = StageTimer::start("reconcile");

        let fact_countries = self.store.fact_country_codes().await?;
        let existing_countries = self.store.dimension_country_codes().await?;
        let country_plan = plan_countries(&fact_countries, &existing_countries);
        for row in &country_plan {
            warn!(country = %row.id, "Uncataloged country; placeholder row created");
        }
        let placeholder_countries = country_plan.len();
        if !country_plan.is_empty() {
            self.store.insert_countries(&country_plan).await?;
        }

        let fact_pairs = self.store.fact_asn_pairs().await?;
        let existing_asns = self.store.dimension_asns().await?;
        let asn_plan = plan_asns(&fact_pairs, &existing_asns);
        for (number, country) in &asn_plan.skipped {
            warn!(
                asn = number,
                country = %country,
                "Conflicting country for ASN; keeping first observed"
            );
        }
        if !asn_plan.inserts.is_empty() {
            for row in &asn_plan.inserts {
                warn!(asn = row.number, "Uncataloged ASN; placeholder row created");
            }
            self.store.insert_asns(&asn_plan.inserts).await?;
        }

        timer.finish_silent();
        Ok((
            placeholder_countries,
            asn_plan.inserts.len(),
            asn_plan.skipped.len(),
        ))
    }
}

fn advance(state: RunState) -> RunState {
    // Transitions are total below Indexed; run() never advances past it.
    let next = state.next().unwrap_or(state);
    info!(state = %next, "Run state advanced");
    next
}

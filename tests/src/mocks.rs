//! In-memory engine implementations with real semantics.
//!
//! The mock warehouse actually deduplicates, thresholds, and weights; the
//! mock store actually builds cubes and verifies referential closure. The
//! tests exercise the orchestration against the same laws the SQL
//! statements implement, without a database.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::Mutex;

use pipeline::BlobStore;
use pipeline_core::{
    AsnDimension, CountryDimension, DailyFact, DateRow, Error, Granularity, RawEvent, Result,
    RiskDimension, RollupRow,
};
use store_client::StatsStore;
use warehouse_client::WarehouseEngine;

/// Blob store over a shared map.
#[derive(Default)]
pub struct MockBlobStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
}

impl MockBlobStore {
    pub fn seed(&self, key: &str, body: &[u8]) {
        self.objects.lock().insert(key.to_string(), body.to_vec());
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.lock().keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl BlobStore for MockBlobStore {
    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        self.objects
            .lock()
            .get(key)
            .cloned()
            .ok_or_else(|| Error::storage(format!("no such object: {key}")))
    }

    async fn put(&self, key: &str, body: &[u8]) -> Result<()> {
        self.seed(key, body);
        Ok(())
    }

    async fn copy(&self, src: &str, dest: &str) -> Result<()> {
        let body = self.get(src).await?;
        self.seed(dest, &body);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.objects
            .lock()
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| Error::storage(format!("no such object: {key}")))
    }
}

/// Warehouse over plain vectors. Raw events come from a seeded source
/// instead of manifest-listed files; everything downstream of loading
/// follows the real aggregation semantics.
pub struct MockWarehouse {
    source: Vec<RawEvent>,
    blobs: Arc<MockBlobStore>,
    events: Mutex<Vec<RawEvent>>,
    risks: Mutex<Vec<RiskDimension>>,
    facts: Mutex<Vec<DailyFact>>,
    pub loaded_manifests: Mutex<Vec<String>>,
}

impl MockWarehouse {
    pub fn new(source: Vec<RawEvent>, blobs: Arc<MockBlobStore>) -> Self {
        Self {
            source,
            blobs,
            events: Mutex::new(Vec::new()),
            risks: Mutex::new(Vec::new()),
            facts: Mutex::new(Vec::new()),
            loaded_manifests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl WarehouseEngine for MockWarehouse {
    async fn rebuild_schema(&self) -> Result<()> {
        self.events.lock().clear();
        self.risks.lock().clear();
        self.facts.lock().clear();
        Ok(())
    }

    async fn load_raw_events(&self, manifest_url: &str) -> Result<()> {
        // The manifest must exist in object storage before a load.
        self.blobs.get(manifest_url).await?;
        self.loaded_manifests.lock().push(manifest_url.to_string());
        *self.events.lock() = self.source.clone();
        Ok(())
    }

    async fn stage_risk_catalog(&self, risks: &[RiskDimension]) -> Result<u64> {
        self.risks.lock().extend_from_slice(risks);
        Ok(risks.len() as u64)
    }

    async fn aggregate_daily(&self, min_distinct_ips: u32) -> Result<u64> {
        let events = self.events.lock();
        let mut groups: HashMap<(NaiveDate, i32, String, Option<i64>), HashSet<String>> =
            HashMap::new();
        for event in events.iter() {
            groups
                .entry((
                    event.date.date_naive(),
                    event.risk,
                    event.country.clone(),
                    event.asn,
                ))
                .or_default()
                .insert(event.ip.clone());
        }

        let mut facts: Vec<DailyFact> = groups
            .into_iter()
            .filter(|(_, ips)| ips.len() as u64 > min_distinct_ips as u64)
            .map(|((date, risk, country, asn), ips)| DailyFact {
                date,
                risk,
                country,
                asn,
                count: ips.len() as i64,
                count_amplified: 0.0,
            })
            .collect();
        facts.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then(a.country.cmp(&b.country))
                .then(a.asn.cmp(&b.asn))
                .then(a.risk.cmp(&b.risk))
        });

        let rows = facts.len() as u64;
        *self.facts.lock() = facts;
        Ok(rows)
    }

    async fn apply_amplification(&self) -> Result<u64> {
        let factors: HashMap<i32, f64> = self
            .risks
            .lock()
            .iter()
            .map(|r| (r.id, r.amplification_factor))
            .collect();
        let mut facts = self.facts.lock();
        for fact in facts.iter_mut() {
            if let Some(factor) = factors.get(&fact.risk) {
                fact.count_amplified = fact.count as f64 * factor;
            }
        }
        Ok(facts.len() as u64)
    }

    async fn unload_daily_counts(&self, dest_url: &str) -> Result<()> {
        let mut csv = String::new();
        for fact in self.facts.lock().iter() {
            let asn = fact.asn.map(|a| a.to_string()).unwrap_or_default();
            csv.push_str(&format!(
                "{},{},{},{},{},{}\n",
                fact.date, fact.risk, fact.country, asn, fact.count, fact.count_amplified
            ));
        }
        // Single-stream unload: exactly one part file.
        self.blobs
            .put(&format!("{dest_url}000"), csv.as_bytes())
            .await
    }
}

/// One cube row before sentinel normalization; subtotal keys are None.
#[derive(Debug, Clone)]
struct CubeRow {
    date: NaiveDate,
    risk: Option<i32>,
    country: Option<String>,
    count: i64,
    count_amplified: f64,
}

/// Relational store over plain vectors, with a real closure check in
/// place of foreign keys.
#[derive(Default)]
pub struct MockStore {
    pub risks: Mutex<Vec<RiskDimension>>,
    pub countries: Mutex<Vec<CountryDimension>>,
    pub asns: Mutex<Vec<AsnDimension>>,
    pub facts: Mutex<Vec<DailyFact>>,
    cubes: Mutex<HashMap<Granularity, Vec<CubeRow>>>,
    pub dates: Mutex<Vec<DateRow>>,
    pub constrained: Mutex<bool>,
    pub indexed: Mutex<bool>,
}

impl MockStore {
    /// Cube rows for a granularity, sentinel keys already applied.
    pub fn cube_rows(&self, granularity: Granularity) -> Vec<RollupRow> {
        self.cubes
            .lock()
            .get(&granularity)
            .map(|rows| {
                rows.iter()
                    .map(|r| RollupRow {
                        date: r.date,
                        risk: r.risk.unwrap(),
                        country: r.country.clone().unwrap(),
                        count: r.count,
                        count_amplified: r.count_amplified,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn parse_fact_line(line: &str) -> DailyFact {
    let fields: Vec<&str> = line.split(',').collect();
    assert_eq!(fields.len(), 6, "malformed fact line: {line}");
    DailyFact {
        date: fields[0].parse().unwrap(),
        risk: fields[1].parse().unwrap(),
        country: fields[2].to_string(),
        asn: (!fields[3].is_empty()).then(|| fields[3].parse().unwrap()),
        count: fields[4].parse().unwrap(),
        count_amplified: fields[5].parse().unwrap(),
    }
}

#[async_trait]
impl StatsStore for MockStore {
    async fn rebuild_schema(&self) -> Result<()> {
        self.risks.lock().clear();
        self.countries.lock().clear();
        self.asns.lock().clear();
        self.facts.lock().clear();
        self.cubes.lock().clear();
        self.dates.lock().clear();
        *self.constrained.lock() = false;
        *self.indexed.lock() = false;
        Ok(())
    }

    async fn copy_fact_counts(&self, csv: &[u8]) -> Result<u64> {
        let text = String::from_utf8(csv.to_vec())
            .map_err(|e| Error::store(format!("fact csv not utf-8: {e}")))?;
        let mut facts = self.facts.lock();
        let mut rows = 0;
        for line in text.lines().filter(|l| !l.is_empty()) {
            facts.push(parse_fact_line(line));
            rows += 1;
        }
        Ok(rows)
    }

    async fn insert_risks(&self, rows: &[RiskDimension]) -> Result<u64> {
        self.risks.lock().extend_from_slice(rows);
        Ok(rows.len() as u64)
    }

    async fn insert_countries(&self, rows: &[CountryDimension]) -> Result<u64> {
        self.countries.lock().extend_from_slice(rows);
        Ok(rows.len() as u64)
    }

    async fn insert_asns(&self, rows: &[AsnDimension]) -> Result<u64> {
        self.asns.lock().extend_from_slice(rows);
        Ok(rows.len() as u64)
    }

    async fn build_cube(&self, granularity: Granularity) -> Result<u64> {
        let facts = self.facts.lock();
        let mut agg: HashMap<(NaiveDate, Option<String>, Option<i32>), (i64, f64)> =
            HashMap::new();
        for fact in facts.iter() {
            let period = granularity.truncate(fact.date);
            let combos = [
                (Some(fact.country.clone()), Some(fact.risk)),
                (Some(fact.country.clone()), None),
                (None, Some(fact.risk)),
                (None, None),
            ];
            for (country, risk) in combos {
                let entry = agg.entry((period, country, risk)).or_default();
                entry.0 += fact.count;
                entry.1 += fact.count_amplified;
            }
        }

        let mut rows: Vec<CubeRow> = agg
            .into_iter()
            .map(|((date, country, risk), (count, count_amplified))| CubeRow {
                date,
                risk,
                country,
                count,
                count_amplified,
            })
            .collect();
        rows.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then(a.country.cmp(&b.country))
                .then(a.risk.cmp(&b.risk))
        });

        let built = rows.len() as u64;
        self.cubes.lock().insert(granularity, rows);
        Ok(built)
    }

    async fn normalize_cube_sentinels(&self, granularity: Granularity) -> Result<u64> {
        let mut cubes = self.cubes.lock();
        let rows = cubes.entry(granularity).or_default();
        let mut rewritten = 0;
        for row in rows.iter_mut() {
            if row.risk.is_none() {
                row.risk = Some(pipeline_core::sentinel::ALL_RISKS_ID);
                rewritten += 1;
            }
            if row.country.is_none() {
                row.country = Some(pipeline_core::sentinel::ALL_COUNTRIES_CODE.to_string());
                rewritten += 1;
            }
        }
        Ok(rewritten)
    }

    async fn collect_dimension_dates(&self) -> Result<Vec<NaiveDate>> {
        let mut dates: BTreeSet<NaiveDate> =
            self.facts.lock().iter().map(|f| f.date).collect();
        for rows in self.cubes.lock().values() {
            dates.extend(rows.iter().map(|r| r.date));
        }
        Ok(dates.into_iter().collect())
    }

    async fn insert_date_rows(&self, rows: &[DateRow]) -> Result<u64> {
        self.dates.lock().extend_from_slice(rows);
        Ok(rows.len() as u64)
    }

    async fn fact_country_codes(&self) -> Result<Vec<String>> {
        let mut codes: Vec<String> = self
            .facts
            .lock()
            .iter()
            .map(|f| f.country.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        codes.sort();
        Ok(codes)
    }

    async fn dimension_country_codes(&self) -> Result<HashSet<String>> {
        Ok(self.countries.lock().iter().map(|c| c.id.clone()).collect())
    }

    async fn fact_asn_pairs(&self) -> Result<Vec<(i64, Option<String>)>> {
        let pairs: BTreeSet<(i64, Option<String>)> = self
            .facts
            .lock()
            .iter()
            .filter_map(|f| f.asn.map(|asn| (asn, Some(f.country.clone()))))
            .collect();
        Ok(pairs.into_iter().collect())
    }

    async fn dimension_asns(&self) -> Result<HashSet<i64>> {
        Ok(self.asns.lock().iter().map(|a| a.number).collect())
    }

    async fn apply_constraints(&self) -> Result<()> {
        let risks: HashSet<i32> = self.risks.lock().iter().map(|r| r.id).collect();
        let countries: HashSet<String> =
            self.countries.lock().iter().map(|c| c.id.clone()).collect();
        let asns: HashSet<i64> = self.asns.lock().iter().map(|a| a.number).collect();
        let dates: HashSet<NaiveDate> = self.dates.lock().iter().map(|d| d.date).collect();

        for fact in self.facts.lock().iter() {
            if !risks.contains(&fact.risk) {
                return Err(Error::constraint(format!("fact risk {}", fact.risk)));
            }
            if !countries.contains(&fact.country) {
                return Err(Error::constraint(format!("fact country {}", fact.country)));
            }
            if let Some(asn) = fact.asn {
                if !asns.contains(&asn) {
                    return Err(Error::constraint(format!("fact asn {asn}")));
                }
            }
            if !dates.contains(&fact.date) {
                return Err(Error::constraint(format!("fact date {}", fact.date)));
            }
        }
        for (granularity, rows) in self.cubes.lock().iter() {
            for row in rows {
                let risk = row
                    .risk
                    .ok_or_else(|| Error::constraint(format!("{granularity} cube NULL risk")))?;
                if !risks.contains(&risk) {
                    return Err(Error::constraint(format!("{granularity} cube risk {risk}")));
                }
                let country = row.country.as_deref().ok_or_else(|| {
                    Error::constraint(format!("{granularity} cube NULL country"))
                })?;
                if !countries.contains(country) {
                    return Err(Error::constraint(format!(
                        "{granularity} cube country {country}"
                    )));
                }
                if !dates.contains(&row.date) {
                    return Err(Error::constraint(format!(
                        "{granularity} cube date {}",
                        row.date
                    )));
                }
            }
        }

        *self.constrained.lock() = true;
        Ok(())
    }

    async fn create_indexes(&self) -> Result<()> {
        *self.indexed.lock() = true;
        Ok(())
    }
}

/// Catalog source over fixed vectors.
pub struct MockCatalogSource {
    pub risks: Vec<RiskDimension>,
    pub countries: Vec<CountryDimension>,
    pub asns: Vec<AsnDimension>,
}

#[async_trait]
impl pipeline::CatalogSource for MockCatalogSource {
    async fn fetch_risks(&self) -> Result<Vec<RiskDimension>> {
        Ok(self.risks.clone())
    }

    async fn fetch_countries(&self) -> Result<Vec<CountryDimension>> {
        Ok(self.countries.clone())
    }

    async fn fetch_asns(&self) -> Result<Vec<AsnDimension>> {
        Ok(self.asns.clone())
    }
}

//! Reference catalog loading.
//!
//! Risk, country, and ASN catalogs are published as data packages: a
//! descriptor JSON whose first resource inlines the rows. Catalogs are
//! fetched whole at the start of each run; there is no caching across
//! runs.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::info;

use pipeline_core::{AsnDimension, CountryDimension, Error, Result, RiskDimension};

/// Seam between the run orchestration and the published catalogs.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_risks(&self) -> Result<Vec<RiskDimension>>;
    async fn fetch_countries(&self) -> Result<Vec<CountryDimension>>;
    async fn fetch_asns(&self) -> Result<Vec<AsnDimension>>;
}

/// Catalog source backed by HTTP data-package descriptors.
pub struct HttpCatalogSource {
    http: reqwest::Client,
    risk_url: String,
    country_url: String,
    asn_url: String,
}

impl HttpCatalogSource {
    pub fn new(risk_url: String, country_url: String, asn_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            risk_url,
            country_url,
            asn_url,
        }
    }

    async fn fetch_rows<T: DeserializeOwned>(&self, url: &str) -> Result<Vec<T>> {
        let descriptor: Value = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| Error::catalog(format!("fetch {url}: {e}")))?
            .error_for_status()
            .map_err(|e| Error::catalog(format!("fetch {url}: {e}")))?
            .json()
            .await
            .map_err(|e| Error::catalog(format!("decode {url}: {e}")))?;

        let rows = parse_rows(&descriptor)?;
        info!(url, rows = rows.len(), "Catalog fetched");
        Ok(rows)
    }
}

/// Extract the first resource's inline rows from a data-package
/// descriptor.
pub fn parse_rows<T: DeserializeOwned>(descriptor: &Value) -> Result<Vec<T>> {
    let data = descriptor
        .get("resources")
        .and_then(Value::as_array)
        .and_then(|resources| resources.first())
        .and_then(|resource| resource.get("data"))
        .ok_or_else(|| Error::catalog("descriptor has no inline resource data"))?;

    serde_json::from_value(data.clone())
        .map_err(|e| Error::catalog(format!("malformed catalog rows: {e}")))
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    async fn fetch_risks(&self) -> Result<Vec<RiskDimension>> {
        self.fetch_rows(&self.risk_url).await
    }

    async fn fetch_countries(&self) -> Result<Vec<CountryDimension>> {
        self.fetch_rows(&self.country_url).await
    }

    async fn fetch_asns(&self) -> Result<Vec<AsnDimension>> {
        self.fetch_rows(&self.asn_url).await
    }
}

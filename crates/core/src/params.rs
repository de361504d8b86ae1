//! Run parameters: everything a single pipeline run needs beyond engine
//! connection settings.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A named reference-catalog source (risk, country, asn).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRef {
    pub name: String,
    pub url: String,
}

/// Parameters of a single run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunParams {
    /// Object-storage prefix holding the cleaned source files and their
    /// data-package descriptor.
    #[serde(default)]
    pub source_path: String,

    /// Object-storage prefix receiving the unloaded daily counts.
    #[serde(default)]
    pub dest_path: String,

    /// Reference catalogs by name. `risk`, `country`, and `asn` are
    /// expected.
    #[serde(default)]
    pub inventory: Vec<CatalogRef>,

    /// Noise-suppression threshold: a (day, risk, country, asn) group
    /// appears in the fact table only if its distinct-IP count is strictly
    /// greater than this. Required; there is no application default, since
    /// the right value depends on how small legitimate countries and ASNs
    /// are allowed to look in public statistics.
    pub min_distinct_ips: Option<u32>,

    /// Operational toggle: skip constraint and index application. The run
    /// then terminates after reconciliation.
    #[serde(default)]
    pub skip_finalize: bool,
}

impl RunParams {
    /// Validate required parameters. Called once at startup; any error here
    /// is fatal before a stage runs.
    pub fn validate(&self) -> Result<()> {
        if self.source_path.is_empty() {
            return Err(Error::config("source_path is required"));
        }
        if self.dest_path.is_empty() {
            return Err(Error::config("dest_path is required"));
        }
        if self.min_distinct_ips.is_none() {
            return Err(Error::config(
                "min_distinct_ips is required (the noise-suppression threshold has no default)",
            ));
        }
        for name in ["risk", "country", "asn"] {
            if self.catalog_url(name).is_none() {
                return Err(Error::config(format!(
                    "inventory is missing the '{name}' catalog"
                )));
            }
        }
        Ok(())
    }

    pub fn threshold(&self) -> u32 {
        self.min_distinct_ips.unwrap_or(0)
    }

    pub fn catalog_url(&self, name: &str) -> Option<&str> {
        self.inventory
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.url.as_str())
    }
}

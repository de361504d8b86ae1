//! Bulk-load manifest construction.
//!
//! The warehouse bulk loader consumes a manifest listing every source file
//! as one logical unit of work. The manifest is built from a data-package
//! descriptor's resource path lists; every listed file is mandatory, so a
//! missing file fails the whole load rather than silently shrinking it.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// One source file in a bulk-load manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub url: String,
    pub mandatory: bool,
}

/// Manifest consumed by the warehouse bulk loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub entries: Vec<ManifestEntry>,
}

impl Manifest {
    /// Build a manifest from a data-package descriptor. One mandatory entry
    /// per resource path, rooted at `source_root`; resources with empty
    /// path lists are skipped.
    pub fn from_datapackage(descriptor: &str, source_root: &str) -> Result<Self> {
        let dp: serde_json::Value = serde_json::from_str(descriptor)?;
        let resources = dp
            .get("resources")
            .and_then(|r| r.as_array())
            .ok_or_else(|| Error::missing_field("resources"))?;

        let mut entries = Vec::new();
        for resource in resources {
            let paths = resource
                .get("path")
                .and_then(|p| p.as_array())
                .ok_or_else(|| Error::missing_field("path"))?;
            for path in paths {
                let key = path
                    .as_str()
                    .ok_or_else(|| Error::catalog("resource path is not a string"))?;
                entries.push(ManifestEntry {
                    url: object_key(source_root, key),
                    mandatory: true,
                });
            }
        }

        Ok(Self { entries })
    }
}

/// Join an object-storage prefix and a key.
pub fn object_key(prefix: &str, key: &str) -> String {
    format!("{}/{}", prefix.trim_end_matches('/'), key)
}

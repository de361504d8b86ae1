//! Store configuration.

use serde::{Deserialize, Serialize};

/// Connection settings for the relational store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Connection URL.
    pub url: String,

    /// Connection pool size.
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

fn default_pool_size() -> u32 {
    4
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost:5432/stats".to_string(),
            pool_size: default_pool_size(),
        }
    }
}

//! Warehouse connection configuration.

use serde::{Deserialize, Serialize};

/// Warehouse client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseConfig {
    /// Warehouse connection URI (Postgres wire protocol).
    pub url: String,
    /// Credential identifier handed to the engine's bulk loader/unloader.
    #[serde(default)]
    pub load_role: String,
    /// Connection pool size.
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

fn default_pool_size() -> u32 {
    4
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost:5439/warehouse".to_string(),
            load_role: String::new(),
            pool_size: default_pool_size(),
        }
    }
}

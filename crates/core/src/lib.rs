//! Core types, planning logic, and run parameters for the stats pipeline.

pub mod calendar;
pub mod error;
pub mod granularity;
pub mod manifest;
pub mod model;
pub mod params;
pub mod reconcile;
pub mod sentinel;

pub use calendar::{date_attributes, DateRow};
pub use error::{Error, Result};
pub use granularity::Granularity;
pub use manifest::{object_key, Manifest, ManifestEntry};
pub use model::*;
pub use params::{CatalogRef, RunParams};

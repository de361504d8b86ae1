//! Run orchestration: the stage sequence that takes raw scan logs to a
//! finalized statistics store.

pub mod refdata;
pub mod runner;
pub mod state;
pub mod storage;

pub use refdata::{CatalogSource, HttpCatalogSource};
pub use runner::{Pipeline, RunReport};
pub use state::RunState;
pub use storage::{BlobStore, FsBlobStore};

//! Tracing setup and run progress reporting.

pub mod progress;
pub mod tracing_setup;

pub use progress::StageTimer;
pub use tracing_setup::{init_tracing, init_tracing_from_env, TracingConfig};

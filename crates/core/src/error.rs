//! Unified error types for the stats pipeline.
//!
//! The taxonomy mirrors the run lifecycle: configuration errors are fatal
//! before any stage runs, engine errors abort the run without retry, and
//! constraint errors mark a run that must be rebuilt from scratch.
//! Referential gaps and ASN conflicts are handled by the reconciler and
//! surface as warnings, not as values of this type.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the stats pipeline.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or invalid run configuration. Fatal at startup; no partial
    /// run is attempted.
    #[error("configuration error: {0}")]
    Config(String),

    /// Reference-catalog retrieval or parsing failure.
    #[error("catalog error: {0}")]
    Catalog(String),

    /// Warehouse engine failure. Aborts the run; the next run starts from
    /// freshly dropped tables.
    #[error("warehouse error: {0}")]
    Warehouse(String),

    /// Relational store failure. Aborts the run.
    #[error("store error: {0}")]
    Store(String),

    /// Object storage failure.
    #[error("storage error: {0}")]
    Storage(String),

    /// Constraint violation after reconciliation. Indicates a reconciliation
    /// bug or inconsistent intermediate state; the run is failed, not
    /// retried.
    #[error("constraint error: {0}")]
    Constraint(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("missing required field: {0}")]
    MissingField(String),
}

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn catalog(msg: impl Into<String>) -> Self {
        Self::Catalog(msg.into())
    }

    pub fn warehouse(msg: impl Into<String>) -> Self {
        Self::Warehouse(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    pub fn constraint(msg: impl Into<String>) -> Self {
        Self::Constraint(msg.into())
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField(field.into())
    }

    /// True for failures that mean the destination tables hold an
    /// inconsistent snapshot and the whole run must be redone.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, Self::Constraint(_))
    }
}

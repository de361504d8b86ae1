//! Run state machine.
//!
//! States advance strictly in order; a run that fails mid-stage reports
//! the last state it completed. There is no resume: the next run rebuilds
//! from EMPTY.

use std::fmt;

/// Progress marker for one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RunState {
    /// Schemas rebuilt, nothing loaded.
    Empty,
    /// Raw events staged and reference catalogs loaded.
    ReferenceLoaded,
    /// Daily distinct-IP aggregation written.
    FactsAggregated,
    /// Amplification weighting applied.
    Weighted,
    /// Facts bridged to the store and cubes built.
    RolledUp,
    /// Dimensions closed over every fact and cube key.
    Reconciled,
    /// Primary and foreign keys in place.
    Constrained,
    /// Access-pattern indexes in place.
    Indexed,
}

impl RunState {
    /// The state that follows this one, if any.
    pub fn next(self) -> Option<RunState> {
        use RunState::*;
        match self {
            Empty => Some(ReferenceLoaded),
            ReferenceLoaded => Some(FactsAggregated),
            FactsAggregated => Some(Weighted),
            Weighted => Some(RolledUp),
            RolledUp => Some(Reconciled),
            Reconciled => Some(Constrained),
            Constrained => Some(Indexed),
            Indexed => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RunState::Empty => "EMPTY",
            RunState::ReferenceLoaded => "REFERENCE_LOADED",
            RunState::FactsAggregated => "FACTS_AGGREGATED",
            RunState::Weighted => "WEIGHTED",
            RunState::RolledUp => "ROLLED_UP",
            RunState::Reconciled => "RECONCILED",
            RunState::Constrained => "CONSTRAINED",
            RunState::Indexed => "INDEXED",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

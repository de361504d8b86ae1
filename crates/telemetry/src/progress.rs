//! Per-stage progress reporting.

use std::time::Instant;

use tracing::info;

/// Wall-clock timer for one pipeline stage. Logs on completion, not on
/// drop, so aborted stages stay silent and the error path owns the story.
pub struct StageTimer {
    stage: &'static str,
    started: Instant,
}

impl StageTimer {
    pub fn start(stage: &'static str) -> Self {
        info!(stage, "Stage started");
        Self {
            stage,
            started: Instant::now(),
        }
    }

    /// Log completion with the row count the stage produced.
    pub fn finish(self, rows: u64) {
        info!(
            stage = self.stage,
            rows,
            elapsed_ms = self.started.elapsed().as_millis() as u64,
            "Stage finished"
        );
    }

    /// Log completion for a stage with no meaningful row count.
    pub fn finish_silent(self) {
        info!(
            stage = self.stage,
            elapsed_ms = self.started.elapsed().as_millis() as u64,
            "Stage finished"
        );
    }
}

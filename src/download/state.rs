//! Per-post outcomes and run statistics.

use crate::error::Error;

/// Final state of one reference.
#[derive(Debug)]
pub enum PostOutcome {
    /// Already in the ledger; nothing was fetched.
    SkippedDuplicate,
    /// Every media item was written to the output tree.
    Saved { files: usize },
    /// Resolution, download or filing failed. The run continues.
    Failed(Error),
}

/// Counters for a whole run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunStats {
    pub total: usize,
    pub saved: usize,
    pub skipped: usize,
    pub failed: usize,
    pub files_written: usize,
}

impl RunStats {
    /// Fold one outcome into the counters.
    pub fn record(&mut self, outcome: &PostOutcome) {
        self.total += 1;
        match outcome {
            PostOutcome::SkippedDuplicate => self.skipped += 1,
            PostOutcome::Saved { files } => {
                self.saved += 1;
                self.files_written += files;
            }
            PostOutcome::Failed(_) => self.failed += 1,
        }
    }
}

//! Resumable deletion driver
//!
//! Consumes the on-disk work queue one identifier at a time. After every
//! confirmed deletion the remaining entries are written back as a complete
//! snapshot before anything else happens, so an interrupted run loses at most
//! the request that was in flight. Failed entries stay queued for a later run.

use crate::error::DriverError;
use crate::pacing::Pacer;
use crate::remote::ProfileEraser;
use crate::storage::SnapshotFile;
use crate::types::{DeletionOutcome, Identifier};
use std::collections::HashSet;
use tracing::{info, warn};

/// Per-run counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriverReport {
    /// Deletion requests sent
    pub attempted: usize,
    /// Accepted by the platform
    pub deleted: usize,
    /// Reported as not found, dropped from the queue
    pub already_absent: usize,
    /// Rejected or errored, left in the queue
    pub failed: usize,
    /// Entries still queued at the end of the run
    pub remaining: usize,
}

/// Drives deletions for one work queue
pub struct DeletionDriver<'a, E: ProfileEraser + ?Sized, P: Pacer> {
    eraser: &'a E,
    pacer: P,
    queue: SnapshotFile,
}

impl<'a, E: ProfileEraser + ?Sized, P: Pacer> DeletionDriver<'a, E, P> {
    pub fn new(eraser: &'a E, queue: SnapshotFile, pacer: P) -> Self {
        Self {
            eraser,
            pacer,
            queue,
        }
    }

    pub fn pacer(&self) -> &P {
        &self.pacer
    }

    /// Visit every queued identifier once.
    ///
    /// Remote failures never end the run early; a queue write failure does.
    pub async fn run(&mut self) -> Result<DriverReport, DriverError> {
        let mut pending = self.queue.read().map_err(DriverError::Load)?;
        let order = pending.clone();
        let mut visited: HashSet<&Identifier> = HashSet::with_capacity(order.len());
        let mut report = DriverReport::default();

        info!(
            queue = %self.queue.path().display(),
            pending = pending.len(),
            "Starting deletion run"
        );

        for identifier in &order {
            // Duplicate rows get one request per run.
            if !visited.insert(identifier) {
                continue;
            }

            report.attempted += 1;
            let outcome = DeletionOutcome::from(self.eraser.request_deletion(identifier).await);

            match outcome {
                DeletionOutcome::Failed(err) => {
                    report.failed += 1;
                    warn!(profile_id = %identifier, error = %err, "Failed to delete profile");
                    continue;
                }
                DeletionOutcome::Deleted => {
                    report.deleted += 1;
                    info!(profile_id = %identifier, "Successfully deleted profile");
                }
                DeletionOutcome::AlreadyAbsent => {
                    report.already_absent += 1;
                    info!(profile_id = %identifier, "Profile already absent, dropping from queue");
                }
            }

            pending.retain(|queued| queued != identifier);
            self.queue.write(&pending).map_err(DriverError::Persist)?;
            self.pacer.pace().await;
        }

        report.remaining = pending.len();
        info!(
            attempted = report.attempted,
            deleted = report.deleted,
            already_absent = report.already_absent,
            failed = report.failed,
            remaining = report.remaining,
            "Deletion process completed"
        );
        Ok(report)
    }
}

//! Reference-minus-exclusion work queue construction

use crate::error::StorageError;
use crate::storage::SnapshotFile;
use crate::types::MembershipSet;
use tracing::info;

/// Identifiers in `reference` that are not in `exclusion`
pub fn difference(reference: &MembershipSet, exclusion: &MembershipSet) -> MembershipSet {
    reference.difference(exclusion).cloned().collect()
}

/// Compute the difference and write it as a fresh work queue.
///
/// The queue order is the set's iteration order, fixed at creation.
pub fn build_work_queue(
    reference: &MembershipSet,
    exclusion: &MembershipSet,
    queue: &SnapshotFile,
) -> Result<MembershipSet, StorageError> {
    let pending = difference(reference, exclusion);
    queue.write(&pending)?;
    info!(
        queue = %queue.path().display(),
        "Total unique profiles in reference lists not in exclusion lists: {}",
        pending.len()
    );
    Ok(pending)
}

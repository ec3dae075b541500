//! The last-write-wins acceptance rule.
//!
//! Written once against [`SyncRecord`] so both schema generations share the
//! exact same conflict semantics.

use taakl_model::Timestamp;
use taakl_store::SyncRecord;

/// Decides whether a mutation with `asserted` timestamp may touch `record`.
///
/// Live record: accepted unless the stored last-modified time is strictly
/// newer than the asserted time; a tie goes to the incoming mutation.
///
/// Soft-deleted record: the stored last-modified time reflects server
/// processing time, so the asserted time is compared against the tombstone
/// instead; the mutation wins iff it is not older than the delete.
pub(crate) fn accepts<R>(record: &R, asserted: Timestamp) -> bool
where
    R: SyncRecord + ?Sized,
{
    match record.deleted_at() {
        Some(deleted) => asserted >= deleted,
        None => asserted >= record.updated_at(),
    }
}

//! Error types for the sync engine.

use taakl_store::StoreError;
use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Faults that can occur in engine operations.
///
/// Data-driven rejections (duplicate identifier, unresolvable parent, stale
/// timestamp, malformed mutation) are not errors; they surface as
/// non-accepted outcomes in the sync statistics.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The underlying store failed; the enclosing transaction was rolled
    /// back.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

//! Incremental sync request/response shapes and import statistics.

use crate::change::ChangeRecord;
use crate::mutation::Mutation;
use serde::{Deserialize, Serialize};
use taakl_model::Timestamp;

/// An incremental sync request: a batch of mutations plus the cutoff of
/// the last sync the client completed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncRequest {
    /// Client-side mutations, applied in submitted order.
    pub changes: Vec<Mutation>,
    /// Cutoff for collecting server-side changes; absent means "return
    /// everything".
    #[serde(rename = "lastSyncTime", skip_serializing_if = "Option::is_none")]
    pub last_sync_time: Option<Timestamp>,
}

/// Acceptance statistics for one sync batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncStats {
    /// Mutations examined.
    pub processed: usize,
    /// Mutations applied.
    pub accepted: usize,
    /// Mutations rejected (stale timestamp, duplicate, unresolvable
    /// parent, malformed).
    pub conflicts: usize,
    /// Server-side change records returned.
    pub returned: usize,
}

/// The result of one incremental sync call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncOutcome {
    /// Server wall-clock time at response; clients use it as the next
    /// cutoff.
    #[serde(rename = "serverTime")]
    pub server_time: Timestamp,
    /// Server-side changes after the cutoff.
    pub changes: Vec<ChangeRecord>,
    /// Acceptance statistics.
    pub stats: SyncStats,
}

/// Per-type counts of records processed by a full import.
///
/// Counts tally records walked, including child records skipped because
/// their parent did not resolve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportStats {
    /// Legacy clients processed.
    pub clients: usize,
    /// Legacy projects processed.
    pub projects: usize,
    /// Legacy tasks processed.
    pub tasks: usize,
    /// Legacy sessions processed.
    pub sessions: usize,
    /// Generalized nodes processed.
    pub nodes: usize,
    /// Node sessions processed.
    pub node_sessions: usize,
}

impl ImportStats {
    /// Total records processed across all types.
    pub fn total(&self) -> usize {
        self.clients + self.projects + self.tasks + self.sessions + self.nodes + self.node_sessions
    }
}

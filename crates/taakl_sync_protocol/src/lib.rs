//! # Taakl Sync Protocol
//!
//! Wire types for the Taakl sync protocol.
//!
//! This crate provides:
//! - `Mutation` for client-asserted changes
//! - `ChangeRecord` for server-side changes returned to clients
//! - `SyncRequest`/`SyncOutcome` for the incremental sync exchange
//! - `Snapshot` for full-tree import/export
//!
//! This is a pure protocol crate with no I/O operations. All shapes
//! serialize to the JSON forms legacy clients expect; timestamps are
//! `YYYY-MM-DD HH:MM:SS` strings.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod change;
mod mutation;
mod outcome;
mod snapshot;

pub use change::{ChangeAction, ChangeRecord};
pub use mutation::{Action, Mutation};
pub use outcome::{ImportStats, SyncOutcome, SyncRequest, SyncStats};
pub use snapshot::{ClientTree, NodeEntry, NodeTaskFields, ProjectTree, SessionEntry, Snapshot, TaskTree};

/// A JSON object payload, as carried in mutations and change records.
pub type FieldMap = serde_json::Map<String, serde_json::Value>;

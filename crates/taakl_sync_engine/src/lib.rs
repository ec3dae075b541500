//! # Taakl Sync Engine
//!
//! Merge, collection, and full-tree codec for the Taakl sync server.
//!
//! This crate provides:
//! - `SyncEngine`, the per-account entry point for incremental sync,
//!   full-tree import/export, and settings
//! - Last-write-wins conflict resolution shared by both schema generations
//! - Tombstone-based change collection by cutoff timestamp
//!
//! # Conflict policy
//!
//! Every mutation carries a client-asserted timestamp. A mutation against a
//! live record is accepted unless the stored last-modified time is strictly
//! newer (ties go to the incoming mutation); against a soft-deleted record
//! the asserted time is compared to the tombstone instead, and an accepted
//! update resurrects the record. Rejections are normal outcomes counted in
//! the batch statistics; only store faults abort, rolling back the whole
//! batch.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod ancestry;
mod applier;
mod codec;
mod coerce;
mod collector;
mod engine;
mod error;
mod lww;
mod settings;

pub use engine::SyncEngine;
pub use error::{EngineError, EngineResult};

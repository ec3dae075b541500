//! # Taakl Store
//!
//! Account-scoped entity store for the Taakl sync server.
//!
//! This crate provides:
//! - Record types for both schema generations (legacy client/project/task/
//!   session and generalized node/node-session)
//! - Per-account tables with stable internal row ids
//! - Snapshot transactions with rollback on fault
//! - JSON file persistence
//!
//! Internal row ids never leave this layer; everything on the wire is
//! addressed by client-generated identifiers.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod account;
mod error;
mod record;
mod store;
mod table;

pub use account::{AccountData, AccountId, AccountRecord, TokenRecord};
pub use error::{StoreError, StoreResult};
pub use record::{
    ClientRecord, NodeRecord, NodeSessionRecord, ProjectRecord, SessionRecord, SyncRecord,
    TaskRecord, UserDataMeta,
};
pub use store::Store;
pub use table::{RowId, Table};

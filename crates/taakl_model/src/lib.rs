//! # Taakl Model
//!
//! Shared domain types for the Taakl sync server.
//!
//! This crate provides:
//! - `Timestamp` for second-granularity wall-clock times
//! - `EntityKind` for the six syncable entity types
//!
//! This is a pure types crate with no I/O operations.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod kind;
mod timestamp;

pub use kind::EntityKind;
pub use timestamp::{Timestamp, TimestampError};

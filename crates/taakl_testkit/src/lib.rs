//! # Taakl Testkit
//!
//! Test fixtures for the Taakl sync server crates: ready-made accounts,
//! sample trees in both schema generations, and file-backed stores with
//! automatic cleanup.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod fixtures;

pub use fixtures::{sample_snapshot, sample_tree, TestAccount};

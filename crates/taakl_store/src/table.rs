//! Generic record tables keyed by internal row id.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Internal row identifier.
///
/// Row ids are assigned per table, monotonically increasing and never
/// reused. They are a storage-internal concern: the wire addresses records
/// by their client-generated identifiers only.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct RowId(u64);

impl RowId {
    /// Creates a row id from its raw value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw id value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row:{}", self.0)
    }
}

/// An ordered table of records.
///
/// Iteration order is row-id order, which equals insertion order; this is
/// what makes change collection stable for a given storage state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table<R> {
    rows: BTreeMap<RowId, R>,
    next: u64,
}

impl<R> Table<R> {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rows: BTreeMap::new(),
            next: 1,
        }
    }

    /// Inserts a record and returns its assigned row id.
    pub fn insert(&mut self, record: R) -> RowId {
        let id = RowId::new(self.next);
        self.next += 1;
        self.rows.insert(id, record);
        id
    }

    /// Returns the record at `id`, if any.
    pub fn get(&self, id: RowId) -> Option<&R> {
        self.rows.get(&id)
    }

    /// Returns a mutable reference to the record at `id`, if any.
    pub fn get_mut(&mut self, id: RowId) -> Option<&mut R> {
        self.rows.get_mut(&id)
    }

    /// Returns the first record matching `predicate`, in insertion order.
    pub fn find<P>(&self, predicate: P) -> Option<(RowId, &R)>
    where
        P: Fn(&R) -> bool,
    {
        self.rows
            .iter()
            .find(|(_, r)| predicate(r))
            .map(|(id, r)| (*id, r))
    }

    /// Iterates all records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (RowId, &R)> {
        self.rows.iter().map(|(id, r)| (*id, r))
    }

    /// Iterates all records mutably, in insertion order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (RowId, &mut R)> {
        self.rows.iter_mut().map(|(id, r)| (*id, r))
    }

    /// Number of records, deleted ones included.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table holds no records.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<R> Default for Table<R> {
    fn default() -> Self {
        Self::new()
    }
}

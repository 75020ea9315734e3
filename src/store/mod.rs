//! Contract between the input format and a sorted, range-partitioned store
//!
//! The input format never talks to a store directly; it goes through
//! [`TabletStore`], which lists a table's tablet ranges, reports which hosts
//! serve a range, and runs a scan with an iterator stack applied server-side.
//! [`MemoryStore`] implements the contract in process.

use std::collections::BTreeSet;

pub mod error;
pub mod iterators;
pub mod memory;
pub mod types;

pub use error::{StoreError, StoreResult};
pub use iterators::{RegExFilter, ServerIterator, VersioningIterator};
pub use memory::{BatchWriter, MemoryStore};
pub use types::{
    Authorizations, ColumnUpdate, Entry, Key, KeyRange, Mutation, ScanRequest, Value,
};

/// Operations the input format needs from a key-value store
pub trait TabletStore: Send + Sync {
    /// Current tablet ranges of `table`, in key order
    fn list_ranges(&self, table: &str) -> StoreResult<Vec<KeyRange>>;

    /// Hosts serving `range` of `table` right now
    fn locations_of(&self, table: &str, range: &KeyRange) -> StoreResult<BTreeSet<String>>;

    /// Sorted entries of `request.range` after the request's iterators ran
    fn scan(&self, request: &ScanRequest) -> StoreResult<Vec<Entry>>;
}

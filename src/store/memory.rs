//! In-memory store for tests and local runs

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, trace};

use super::error::{StoreError, StoreResult};
use super::iterators::{build_iterator, limit_versions};
use super::types::{Entry, Key, KeyRange, Mutation, ScanRequest, Value};
use super::TabletStore;

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_MAX_PENDING: usize = 1000;

#[derive(Debug, Default)]
struct Table {
    split_points: BTreeSet<Vec<u8>>,
    cells: BTreeMap<Key, Value>,
}

impl Table {
    fn tablet_ranges(&self) -> Vec<KeyRange> {
        let mut ranges = Vec::with_capacity(self.split_points.len() + 1);
        let mut start = None;
        for point in &self.split_points {
            ranges.push(KeyRange::new(start, Some(point.clone())));
            start = Some(point.clone());
        }
        ranges.push(KeyRange::new(start, None));
        ranges
    }
}

/// Sorted tables held in process, with tablets assigned round-robin to hosts
#[derive(Debug)]
pub struct MemoryStore {
    hosts: Vec<String>,
    tables: RwLock<HashMap<String, Table>>,
    clock: AtomicU64,
}

impl MemoryStore {
    /// Create a store whose tablets are served by `hosts`
    pub fn new<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut hosts: Vec<String> = hosts.into_iter().map(Into::into).collect();
        if hosts.is_empty() {
            hosts.push(DEFAULT_HOST.to_string());
        }
        Self {
            hosts,
            tables: RwLock::new(HashMap::new()),
            clock: AtomicU64::new(0),
        }
    }

    pub fn create_table(&self, name: &str) -> StoreResult<()> {
        let mut tables = self.write()?;
        if tables.contains_key(name) {
            return Err(StoreError::TableExists(name.to_string()));
        }
        tables.insert(name.to_string(), Table::default());
        debug!(table = name, "Created table");
        Ok(())
    }

    pub fn delete_table(&self, name: &str) -> StoreResult<()> {
        if self.write()?.remove(name).is_none() {
            return Err(StoreError::TableNotFound(name.to_string()));
        }
        debug!(table = name, "Deleted table");
        Ok(())
    }

    pub fn table_exists(&self, name: &str) -> StoreResult<bool> {
        Ok(self.read()?.contains_key(name))
    }

    /// Split the table's tablets at each of `points`
    pub fn add_splits<I, P>(&self, table: &str, points: I) -> StoreResult<()>
    where
        I: IntoIterator<Item = P>,
        P: Into<Vec<u8>>,
    {
        let mut tables = self.write()?;
        let entry = tables
            .get_mut(table)
            .ok_or_else(|| StoreError::TableNotFound(table.to_string()))?;
        entry.split_points.extend(points.into_iter().map(Into::into));
        debug!(table, tablets = entry.split_points.len() + 1, "Added splits");
        Ok(())
    }

    /// Buffered writer for `table`
    pub fn batch_writer(&self, table: &str) -> StoreResult<BatchWriter<'_>> {
        if !self.table_exists(table)? {
            return Err(StoreError::TableNotFound(table.to_string()));
        }
        Ok(BatchWriter {
            store: self,
            table: table.to_string(),
            pending: Vec::new(),
            max_pending: DEFAULT_MAX_PENDING,
        })
    }

    fn apply_mutations(&self, table: &str, mutations: Vec<Mutation>) -> StoreResult<()> {
        let mut tables = self.write()?;
        let entry = tables
            .get_mut(table)
            .ok_or_else(|| StoreError::TableNotFound(table.to_string()))?;

        let count = mutations.len();
        for mutation in mutations {
            for update in mutation.updates() {
                let timestamp = update
                    .timestamp
                    .unwrap_or_else(|| self.clock.fetch_add(1, Ordering::SeqCst) + 1);
                let key = Key {
                    row: mutation.row().to_vec(),
                    family: update.family.clone(),
                    qualifier: update.qualifier.clone(),
                    visibility: update.visibility.clone(),
                    timestamp,
                };
                entry.cells.insert(key, update.value.clone());
            }
        }
        trace!(table, mutations = count, "Applied mutations");
        Ok(())
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, HashMap<String, Table>>> {
        self.tables.read().map_err(StoreError::lock)
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, HashMap<String, Table>>> {
        self.tables.write().map_err(StoreError::lock)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new([DEFAULT_HOST])
    }
}

impl TabletStore for MemoryStore {
    fn list_ranges(&self, table: &str) -> StoreResult<Vec<KeyRange>> {
        let tables = self.read()?;
        let entry = tables
            .get(table)
            .ok_or_else(|| StoreError::TableNotFound(table.to_string()))?;
        Ok(entry.tablet_ranges())
    }

    fn locations_of(&self, table: &str, range: &KeyRange) -> StoreResult<BTreeSet<String>> {
        let tables = self.read()?;
        let entry = tables
            .get(table)
            .ok_or_else(|| StoreError::TableNotFound(table.to_string()))?;

        Ok(entry
            .tablet_ranges()
            .iter()
            .enumerate()
            .filter(|(_, tablet)| tablet.overlaps(range))
            .map(|(idx, _)| self.hosts[idx % self.hosts.len()].clone())
            .collect())
    }

    fn scan(&self, request: &ScanRequest) -> StoreResult<Vec<Entry>> {
        // instantiate everything up front so a bad stack fails before any read
        let iterators = request
            .iterators
            .iter()
            .map(build_iterator)
            .collect::<StoreResult<Vec<_>>>()?;

        let tables = self.read()?;
        let entry = tables
            .get(&request.table)
            .ok_or_else(|| StoreError::TableNotFound(request.table.clone()))?;

        let mut entries: Vec<Entry> = entry
            .cells
            .iter()
            .filter(|(key, _)| request.range.contains_row(&key.row))
            .filter(|(key, _)| request.authorizations.can_see(&key.visibility))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        drop(tables);

        if let Some(max_versions) = request.max_versions {
            entries = limit_versions(entries, max_versions as usize);
        }
        for iterator in &iterators {
            entries = iterator.apply(entries);
        }

        debug!(
            table = %request.table,
            range = %request.range,
            iterators = iterators.len(),
            entries = entries.len(),
            "Scanned range"
        );
        Ok(entries)
    }
}

/// Buffers mutations and writes them to the store in batches
pub struct BatchWriter<'a> {
    store: &'a MemoryStore,
    table: String,
    pending: Vec<Mutation>,
    max_pending: usize,
}

impl BatchWriter<'_> {
    pub fn with_max_pending(mut self, max_pending: usize) -> Self {
        self.max_pending = max_pending.max(1);
        self
    }

    pub fn add_mutation(&mut self, mutation: Mutation) -> StoreResult<()> {
        self.pending.push(mutation);
        if self.pending.len() >= self.max_pending {
            self.flush()?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> StoreResult<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let batch = std::mem::take(&mut self.pending);
        self.store.apply_mutations(&self.table, batch)
    }

    /// Flush what is left and release the writer
    pub fn close(mut self) -> StoreResult<()> {
        self.flush()
    }
}

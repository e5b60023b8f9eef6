//! Table Cache Module
//! Keeps loaded tables keyed by their source-candidate list.

use super::loader::{DataLoader, LoaderError, SourceCandidate};
use super::table::Table;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Loaded tables, shared read-only once inserted.
///
/// Entries live until [`TableCache::invalidate`] is called; nothing
/// expires on its own.
#[derive(Default)]
pub struct TableCache {
    entries: HashMap<Vec<SourceCandidate>, Arc<Table>>,
}

impl TableCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached table for `sources`, loading it on first use.
    pub fn get_or_load(&mut self, sources: &[SourceCandidate]) -> Result<Arc<Table>, LoaderError> {
        if let Some(table) = self.get(sources) {
            debug!(sources = sources.len(), "table cache hit");
            return Ok(table);
        }

        let table = DataLoader::load(sources)?;
        Ok(self.insert(sources.to_vec(), table))
    }

    pub fn get(&self, sources: &[SourceCandidate]) -> Option<Arc<Table>> {
        self.entries.get(sources).cloned()
    }

    /// Store a table loaded elsewhere (e.g. on a worker thread).
    pub fn insert(&mut self, sources: Vec<SourceCandidate>, table: Table) -> Arc<Table> {
        let table = Arc::new(table);
        self.entries.insert(sources, Arc::clone(&table));
        table
    }

    /// Drop the entry for `sources`. Returns whether one existed.
    pub fn invalidate(&mut self, sources: &[SourceCandidate]) -> bool {
        let removed = self.entries.remove(sources).is_some();
        if removed {
            info!(sources = sources.len(), "table cache entry invalidated");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

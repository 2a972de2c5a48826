//! In-memory storage implementation for testing and development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::StoreResult;
use crate::traits::store::{CacheStore, FetchLog};
use crate::types::cache::{AttemptStatus, CacheEntry, FetchLogEntry};

/// In-memory cache entries and attempt log.
///
/// Useful for testing and development. Not suitable for production
/// as data is lost on restart.
pub struct MemoryStore {
    entries: RwLock<HashMap<String, CacheEntry>>,
    log: RwLock<Vec<FetchLogEntry>>,
    upserts: RwLock<usize>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            log: RwLock::new(Vec::new()),
            upserts: RwLock::new(0),
        }
    }

    /// Seed an entry without counting it as a write.
    pub fn with_entry(self, entry: CacheEntry) -> Self {
        self.entries
            .write()
            .unwrap()
            .insert(entry.isin.clone(), entry);
        self
    }

    /// Clear all stored data.
    pub fn clear(&self) {
        self.entries.write().unwrap().clear();
        self.log.write().unwrap().clear();
        *self.upserts.write().unwrap() = 0;
    }

    /// Current entry for an identifier.
    pub fn entry(&self, isin: &str) -> Option<CacheEntry> {
        self.entries.read().unwrap().get(isin).cloned()
    }

    /// Get the number of cached identifiers.
    pub fn entry_count(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    /// Number of upserts since creation.
    pub fn upsert_count(&self) -> usize {
        *self.upserts.read().unwrap()
    }

    /// Copy of the attempt log, oldest first.
    pub fn log_entries(&self) -> Vec<FetchLogEntry> {
        self.log.read().unwrap().clone()
    }

    /// Logged attempts with the given status.
    pub fn log_count(&self, status: AttemptStatus) -> usize {
        self.log
            .read()
            .unwrap()
            .iter()
            .filter(|e| e.status == status)
            .count()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get_entry(&self, isin: &str) -> StoreResult<Option<CacheEntry>> {
        Ok(self.entries.read().unwrap().get(isin).cloned())
    }

    async fn upsert_entry(&self, entry: &CacheEntry) -> StoreResult<()> {
        self.entries
            .write()
            .unwrap()
            .insert(entry.isin.clone(), entry.clone());
        *self.upserts.write().unwrap() += 1;
        Ok(())
    }
}

#[async_trait]
impl FetchLog for MemoryStore {
    async fn append(&self, entry: &FetchLogEntry) -> StoreResult<()> {
        self.log.write().unwrap().push(entry.clone());
        Ok(())
    }
}

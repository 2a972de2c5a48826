//! Storage traits for the result cache and the attempt log.
//!
//! The storage layer is split into focused traits:
//! - `CacheStore`: one entry per identifier, single-key upsert
//! - `FetchLog`: append-only audit records
//! - `WeightsStore`: composite trait combining both

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::types::cache::{CacheEntry, FetchLogEntry};

/// Per-identifier result cache.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Get the entry for an identifier, fresh or not.
    async fn get_entry(&self, isin: &str) -> StoreResult<Option<CacheEntry>>;

    /// Insert or fully overwrite the entry for `entry.isin`.
    async fn upsert_entry(&self, entry: &CacheEntry) -> StoreResult<()>;

    /// Cheap liveness probe for health checks.
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

/// Append-only attempt log. No read path is required by the workflow.
#[async_trait]
pub trait FetchLog: Send + Sync {
    /// Append one record.
    async fn append(&self, entry: &FetchLogEntry) -> StoreResult<()>;
}

/// Composite trait for full storage capability.
pub trait WeightsStore: CacheStore + FetchLog {}

// Blanket implementation: anything implementing both traits is a WeightsStore
impl<T: CacheStore + FetchLog> WeightsStore for T {}

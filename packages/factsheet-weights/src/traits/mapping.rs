//! Read-only identifier → mapping lookup.

use crate::types::mapping::MappingEntry;

/// Static per-identifier configuration, injected rather than global.
pub trait MappingSource: Send + Sync {
    /// Entry for a normalized identifier, if any.
    fn lookup(&self, isin: &str) -> Option<MappingEntry>;
}

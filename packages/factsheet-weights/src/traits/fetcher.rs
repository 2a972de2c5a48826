//! Document download capability.

use async_trait::async_trait;

use crate::error::FetchResult;

/// Downloads one document with size cap, timeout and bounded retries.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Fetch the raw bytes, or the last error after all attempts.
    async fn download(&self, url: &str) -> FetchResult<Vec<u8>>;
}

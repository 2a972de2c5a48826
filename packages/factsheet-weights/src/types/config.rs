//! Pipeline configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default user agent sent with every outbound request.
pub const DEFAULT_USER_AGENT: &str = "FactsheetWeights/1.0 (fact sheet parser)";

/// Tunables for the resolution-and-extraction pipeline.
///
/// All durations are stored as whole seconds (or milliseconds where
/// noted) so the config round-trips cleanly through JSON and env vars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Version of the extraction logic written into cache entries.
    ///
    /// Bump when parsing changes so stale parses can be told apart.
    pub parse_version: i32,

    /// Lifetime of a successful cache entry. Default: 24h.
    pub success_ttl_secs: u64,

    /// Lifetime of a negative cache entry. Default: 30min.
    pub failure_ttl_secs: u64,

    /// Document size cap. Default: 15 MiB.
    pub max_document_bytes: u64,

    /// Per-attempt download timeout. Default: 30s.
    pub fetch_timeout_secs: u64,

    /// Extra download attempts after the first. Default: 2.
    pub fetch_retries: u32,

    /// Pause between download attempts (milliseconds). Default: 1000.
    pub retry_delay_ms: u64,

    /// Product page / aggregator / listing timeout. Default: 15s.
    pub discovery_timeout_secs: u64,

    /// Catalog document timeout. Default: 20s.
    pub catalog_timeout_secs: u64,

    /// Catalog document size cap. Default: 5 MiB.
    pub catalog_max_bytes: u64,

    /// Vendor holdings request timeout. Default: 15s.
    pub holdings_timeout_secs: u64,

    /// Vendor NAV request timeout. Default: 10s.
    pub nav_timeout_secs: u64,

    /// OCR page magnification. Default: 3.
    pub ocr_render_scale: u32,

    pub user_agent: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            parse_version: 1,
            success_ttl_secs: 24 * 60 * 60,
            failure_ttl_secs: 30 * 60,
            max_document_bytes: 15 * 1024 * 1024,
            fetch_timeout_secs: 30,
            fetch_retries: 2,
            retry_delay_ms: 1000,
            discovery_timeout_secs: 15,
            catalog_timeout_secs: 20,
            catalog_max_bytes: 5 * 1024 * 1024,
            holdings_timeout_secs: 15,
            nav_timeout_secs: 10,
            ocr_render_scale: 3,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl PipelineConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the success cache lifetime.
    pub fn with_success_ttl(mut self, ttl: Duration) -> Self {
        self.success_ttl_secs = ttl.as_secs();
        self
    }

    /// Set the negative cache lifetime.
    pub fn with_failure_ttl(mut self, ttl: Duration) -> Self {
        self.failure_ttl_secs = ttl.as_secs();
        self
    }

    /// Set the number of extra download attempts.
    pub fn with_fetch_retries(mut self, retries: u32) -> Self {
        self.fetch_retries = retries;
        self
    }

    /// Set the pause between download attempts.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay_ms = delay.as_millis() as u64;
        self
    }

    /// Set the document size cap.
    pub fn with_max_document_bytes(mut self, bytes: u64) -> Self {
        self.max_document_bytes = bytes;
        self
    }

    /// Set the parse version.
    pub fn with_parse_version(mut self, version: i32) -> Self {
        self.parse_version = version;
        self
    }

    /// Set the user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn success_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.success_ttl_secs as i64)
    }

    pub fn failure_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.failure_ttl_secs as i64)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn discovery_timeout(&self) -> Duration {
        Duration::from_secs(self.discovery_timeout_secs)
    }

    pub fn catalog_timeout(&self) -> Duration {
        Duration::from_secs(self.catalog_timeout_secs)
    }

    pub fn holdings_timeout(&self) -> Duration {
        Duration::from_secs(self.holdings_timeout_secs)
    }

    pub fn nav_timeout(&self) -> Duration {
        Duration::from_secs(self.nav_timeout_secs)
    }
}

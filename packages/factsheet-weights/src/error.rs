//! Typed errors for the factsheet weights library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling. The terminal, caller-facing
//! failure of a workflow run is [`WorkflowError`](crate::types::result::WorkflowError),
//! which lives with the other output types.

use thiserror::Error;

/// Allow-list violations (SSRF protection).
#[derive(Debug, Error)]
pub enum SecurityError {
    /// Target address is not on the allow-list (or is not https)
    #[error("URL not allowed: {url}")]
    UrlNotAllowed { url: String },

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

/// Errors from the transport and the document fetcher.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Security validation failed; never retried
    #[error("security error: {0}")]
    NotAllowed(#[from] SecurityError),

    /// Request exceeded its wall-clock budget
    #[error("timeout fetching: {url}")]
    Timeout { url: String },

    /// Server answered with a non-success status
    #[error("HTTP {status} fetching: {url}")]
    HttpStatus { url: String, status: u16 },

    /// Payload exceeded the configured byte cap
    #[error("document too large: {size} bytes (max {max})")]
    TooLarge { size: u64, max: u64 },

    /// Connection, TLS or body read failure
    #[error("network error: {0}")]
    Network(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl FetchError {
    /// HTTP status carried by this error, if any.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            FetchError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether another attempt could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, FetchError::NotAllowed(_))
    }
}

/// Both text-layer extraction methods failed.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The document could not be read by either method
    #[error("text extraction failed: primary: {primary}; page-by-page: {secondary}")]
    Unreadable { primary: String, secondary: String },

    /// The blocking extraction task died
    #[error("extraction task failed: {0}")]
    Task(String),
}

/// OCR failures. Always advisory to the workflow.
#[derive(Debug, Error)]
pub enum OcrError {
    /// A required external tool is not on PATH
    #[error("OCR tool not available: {0}")]
    MissingTool(String),

    /// The document could not be opened to locate the allocation page
    #[error("could not read document: {0}")]
    Document(String),

    /// Rasterizing the target page failed
    #[error("page render failed: {0}")]
    Render(String),

    /// Recognition failed or produced no output
    #[error("recognition failed: {0}")]
    Recognition(String),

    /// Temp file handling failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The blocking page scan died
    #[error("page scan task failed: {0}")]
    Task(String),
}

/// URL resolution failures.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Every discovery strategy was exhausted
    #[error("no factsheet URL found for {isin}; not listed by the aggregator or any supported issuer")]
    NotFound { isin: String },

    /// A mapped address is outside the allow-list
    #[error("security error: {0}")]
    NotAllowed(#[from] SecurityError),
}

/// Cache and log store failures.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database operation failed
    #[error("storage error: {0}")]
    Database(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Weights JSON could not be (de)serialized
    #[error("JSON error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored row could not be decoded
    #[error("invalid row: {0}")]
    InvalidRow(String),
}

/// Configuration loading failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Mapping file could not be read
    #[error("could not read mapping file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Mapping file is not a valid mapping object
    #[error("invalid mapping JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for allow-list checks.
pub type SecurityResult<T> = std::result::Result<T, SecurityError>;

/// Result type alias for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

//! Factsheet Weights
//!
//! Locates, downloads and parses fund-issuer factsheets to recover the
//! crypto constituent weights of an exchange-traded product, keyed by ISIN.
//!
//! # Flow
//!
//! ```text
//! validate -> cache -> resolve -> fetch -> extract -> parse
//!                                                      |
//!                       vendor holdings <- implausible +
//!                       OCR             <- still implausible
//!                                                      |
//!                                            validate -> commit
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use factsheet_weights::{MemoryStore, PipelineConfig, StaticMapping, WeightsWorkflow};
//! use std::sync::Arc;
//!
//! let mapping = Arc::new(StaticMapping::from_file("isin_mapping.json")?);
//! let store = Arc::new(MemoryStore::new());
//! let workflow = WeightsWorkflow::production(mapping, store, PipelineConfig::default());
//!
//! match workflow.run("CH0454664001").await {
//!     Ok(result) => println!("{:?}", result.constituents),
//!     Err(err) => eprintln!("{}", err),
//! }
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Capabilities injected into the workflow
//! - [`types`] - Constituents, providers, cache rows, results, config
//! - [`pipeline`] - The workflow state machine and escalation policy
//! - [`resolver`] - Factsheet source discovery
//! - [`parser`] - Text-pattern extraction of weights
//! - [`fetch`] - HTTP transport and document download
//! - [`text`] / [`ocr`] - Text layer and OCR fallbacks
//! - [`vendor`] - Issuer catalog and vendor holdings endpoint
//! - [`stores`] - Cache and attempt-log backends
//! - [`security`] - Allow-list for outbound requests
//! - [`testing`] - Mock implementations for testing

pub mod error;
pub mod fetch;
pub mod ocr;
pub mod parser;
pub mod pipeline;
pub mod resolver;
pub mod security;
pub mod stores;
pub mod testing;
pub mod text;
pub mod traits;
pub mod types;
pub mod vendor;

// Re-export core types at crate root
pub use error::{
    ConfigError, ExtractError, FetchError, OcrError, ResolveError, SecurityError, StoreError,
};
pub use traits::{
    extractor::{OcrEngine, OcrOutput, TextExtractor},
    fetcher::DocumentFetcher,
    holdings::{HoldingsSnapshot, HoldingsSource},
    mapping::MappingSource,
    resolver::{ResolvedSource, SourceResolver},
    store::{CacheStore, FetchLog, WeightsStore},
    transport::{FetchRequest, Transport, ValidatedTransport},
};
pub use types::{
    cache::{AttemptStatus, CacheEntry, FetchLogEntry},
    config::PipelineConfig,
    constituent::{is_plausible, normalize_to_100, weight_sum, ConstituentWeight},
    mapping::{MappingEntry, StaticMapping},
    provider::Provider,
    result::{CacheStatus, ErrorCode, WeightsResult, WorkflowError, WorkflowResult},
};

pub use fetch::{HttpDocumentFetcher, HttpTransport};
pub use ocr::TesseractOcr;
pub use parser::{parse_factsheet_text, ParsedFactsheet};
pub use pipeline::WeightsWorkflow;
pub use resolver::FactsheetResolver;
pub use security::AllowList;
pub use text::PdfTextExtractor;
pub use vendor::{HoldingsApiClient, ProductCatalog};

// Re-export stores
pub use stores::MemoryStore;

#[cfg(feature = "sqlite")]
pub use stores::SqliteStore;

#[cfg(feature = "postgres")]
pub use stores::PostgresStore;

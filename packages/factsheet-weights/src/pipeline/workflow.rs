//! The per-identifier run: validate, cache, resolve, fetch, extract, parse,
//! escalate, commit.
//!
//! Each step is a [`RunState`]; a step consumes its state and yields the
//! next one until a terminal [`WorkflowResult`] is reached.

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::escalation::{self, Escalation};
use crate::fetch::{HttpDocumentFetcher, HttpTransport};
use crate::ocr::TesseractOcr;
use crate::parser::parse_factsheet_text;
use crate::resolver::FactsheetResolver;
use crate::text::PdfTextExtractor;
use crate::traits::{
    extractor::{OcrEngine, TextExtractor},
    fetcher::DocumentFetcher,
    holdings::{HoldingsSnapshot, HoldingsSource},
    mapping::MappingSource,
    resolver::{ResolvedSource, SourceResolver},
    store::WeightsStore,
    transport::{Transport, ValidatedTransport},
};
use crate::types::{
    cache::{CacheEntry, FetchLogEntry},
    config::PipelineConfig,
    constituent::{weight_sum, ConstituentWeight},
    provider::Provider,
    result::{CacheStatus, ErrorCode, WeightsResult, WorkflowError, WorkflowResult},
};
use crate::vendor::{ticker_from_factsheet_url, HoldingsApiClient};

lazy_static! {
    static ref ISIN_PATTERN: Regex = Regex::new(r"^[A-Z]{2}[A-Z0-9]{9}[0-9]$").unwrap();
}

/// Trim, uppercase and drop all interior whitespace.
pub fn normalize_isin(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}

/// Two letters, nine alphanumerics, one check digit.
pub fn is_valid_isin(isin: &str) -> bool {
    ISIN_PATTERN.is_match(isin)
}

/// A downloaded document moving through extraction and parsing.
struct Document {
    isin: String,
    url: String,
    provider: Provider,
    bytes: Vec<u8>,
}

/// Current answer for a document, revised by each escalation tier.
struct Candidate {
    as_of_date: Option<String>,
    constituents: Vec<ConstituentWeight>,
}

/// Named states of one run.
enum RunState {
    Validate { raw: String },
    CheckCache { isin: String },
    Resolve { isin: String },
    Direct { isin: String, source_url: String, constituents: Vec<ConstituentWeight> },
    Fetch { isin: String, url: String, provider: Provider },
    Extract { doc: Document },
    Parse { doc: Document, text: String },
    Escalate { doc: Document, candidate: Candidate, previous: Option<Escalation> },
    Commit { doc: Document, candidate: Candidate },
    Done(WorkflowResult),
}

impl RunState {
    fn name(&self) -> &'static str {
        match self {
            RunState::Validate { .. } => "validate",
            RunState::CheckCache { .. } => "check_cache",
            RunState::Resolve { .. } => "resolve",
            RunState::Direct { .. } => "direct",
            RunState::Fetch { .. } => "fetch",
            RunState::Extract { .. } => "extract",
            RunState::Parse { .. } => "parse",
            RunState::Escalate { .. } => "escalate",
            RunState::Commit { .. } => "commit",
            RunState::Done(_) => "done",
        }
    }
}

/// Resolution-and-extraction workflow over injected capabilities.
///
/// # Example
///
/// ```rust,ignore
/// let workflow = WeightsWorkflow::production(mapping, store, PipelineConfig::default());
/// let result = workflow.run("CH0454664001").await;
/// ```
pub struct WeightsWorkflow {
    resolver: Arc<dyn SourceResolver>,
    fetcher: Arc<dyn DocumentFetcher>,
    extractor: Arc<dyn TextExtractor>,
    holdings: Arc<dyn HoldingsSource>,
    ocr: Arc<dyn OcrEngine>,
    store: Arc<dyn WeightsStore>,
    config: PipelineConfig,
}

impl WeightsWorkflow {
    /// Create a workflow with default configuration.
    pub fn new(
        resolver: Arc<dyn SourceResolver>,
        fetcher: Arc<dyn DocumentFetcher>,
        extractor: Arc<dyn TextExtractor>,
        holdings: Arc<dyn HoldingsSource>,
        ocr: Arc<dyn OcrEngine>,
        store: Arc<dyn WeightsStore>,
    ) -> Self {
        Self {
            resolver,
            fetcher,
            extractor,
            holdings,
            ocr,
            store,
            config: PipelineConfig::default(),
        }
    }

    /// Wire the production capabilities, all sharing one allow-listed
    /// HTTP transport.
    pub fn production(
        mapping: Arc<dyn MappingSource>,
        store: Arc<dyn WeightsStore>,
        config: PipelineConfig,
    ) -> Self {
        let transport: Arc<dyn Transport> = Arc::new(ValidatedTransport::new(
            HttpTransport::new().with_user_agent(config.user_agent.clone()),
        ));
        let extractor: Arc<dyn TextExtractor> = Arc::new(PdfTextExtractor::new());

        Self {
            resolver: Arc::new(FactsheetResolver::new(
                mapping,
                transport.clone(),
                extractor.clone(),
                &config,
            )),
            fetcher: Arc::new(HttpDocumentFetcher::new(transport.clone(), &config)),
            holdings: Arc::new(HoldingsApiClient::new(transport, extractor.clone(), &config)),
            ocr: Arc::new(TesseractOcr::new(config.ocr_render_scale)),
            extractor,
            store,
            config,
        }
    }

    /// Set custom configuration.
    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Get a reference to the configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// The store behind the cache and the attempt log.
    pub fn store(&self) -> &Arc<dyn WeightsStore> {
        &self.store
    }

    /// Run the workflow for one identifier. Never panics; every failure is
    /// a [`WorkflowError`].
    pub async fn run(&self, raw_isin: &str) -> WorkflowResult {
        let mut state = RunState::Validate {
            raw: raw_isin.to_string(),
        };
        loop {
            debug!(state = state.name(), "Workflow step");
            state = match state {
                RunState::Validate { raw } => self.validate(&raw),
                RunState::CheckCache { isin } => self.check_cache(isin).await,
                RunState::Resolve { isin } => self.resolve(isin).await,
                RunState::Direct {
                    isin,
                    source_url,
                    constituents,
                } => self.commit_direct(isin, source_url, constituents).await,
                RunState::Fetch { isin, url, provider } => self.fetch(isin, url, provider).await,
                RunState::Extract { doc } => self.extract(doc).await,
                RunState::Parse { doc, text } => Self::parse(doc, &text),
                RunState::Escalate {
                    doc,
                    candidate,
                    previous,
                } => self.escalate(doc, candidate, previous).await,
                RunState::Commit { doc, candidate } => self.commit(doc, candidate).await,
                RunState::Done(result) => return result,
            };
        }
    }

    fn validate(&self, raw: &str) -> RunState {
        let isin = normalize_isin(raw);
        if is_valid_isin(&isin) {
            RunState::CheckCache { isin }
        } else {
            debug!(input = %raw, "Rejected malformed identifier");
            RunState::Done(Err(WorkflowError::new(
                ErrorCode::InvalidIdentifier,
                format!("invalid ISIN format: {:?}", raw.trim()),
            )))
        }
    }

    async fn check_cache(&self, isin: String) -> RunState {
        let entry = match self.store.get_entry(&isin).await {
            Ok(entry) => entry,
            Err(e) => {
                warn!(isin = %isin, error = %e, "Cache read failed, treating as miss");
                None
            }
        };

        let now = Utc::now();
        let Some(entry) = entry.filter(|e| e.is_fresh(now)) else {
            return RunState::Resolve { isin };
        };

        let constituents = match entry.constituents() {
            Ok(constituents) => constituents,
            Err(e) => {
                warn!(isin = %isin, error = %e, "Cached weights unreadable, treating as miss");
                return RunState::Resolve { isin };
            }
        };

        info!(isin = %isin, constituents = constituents.len(), "Cache hit");
        let nav_usd = match ticker_from_factsheet_url(&entry.source_pdf_url) {
            Some(ticker) => self.holdings.fetch_nav(&ticker).await,
            None => None,
        };

        RunState::Done(Ok(WeightsResult {
            isin,
            as_of_date: entry.as_of_date,
            constituents,
            nav_usd,
            source_pdf_url: entry.source_pdf_url,
            cache_status: CacheStatus::Hit,
            fetched_at: entry.fetched_at.to_rfc3339(),
        }))
    }

    async fn resolve(&self, isin: String) -> RunState {
        match self.resolver.resolve(&isin).await {
            Ok(ResolvedSource::Document { url, provider }) => {
                info!(isin = %isin, url = %url, provider = %provider, "Resolved factsheet");
                RunState::Fetch { isin, url, provider }
            }
            Ok(ResolvedSource::Constituents {
                constituents,
                source_url,
            }) => RunState::Direct {
                isin,
                source_url,
                constituents,
            },
            Err(e) => {
                let message = e.to_string();
                warn!(isin = %isin, error = %message, "No factsheet source");
                self.record(FetchLogEntry::error(&isin, Utc::now(), &message))
                    .await;
                RunState::Done(Err(WorkflowError::new(ErrorCode::UrlNotFound, message)))
            }
        }
    }

    /// Aggregator answered without a document: no hash, no as-of date.
    async fn commit_direct(
        &self,
        isin: String,
        source_url: String,
        constituents: Vec<ConstituentWeight>,
    ) -> RunState {
        let fetched_at = Utc::now();
        self.remember(CacheEntry::success(
            &isin,
            &source_url,
            &constituents,
            fetched_at,
            self.config.success_ttl(),
            self.config.parse_version,
        ))
        .await;
        self.record(
            FetchLogEntry::success(&isin, fetched_at)
                .with_message(format!("{} constituents ({})", constituents.len(), Provider::JustEtf))
                .with_source_url(&source_url),
        )
        .await;

        let nav_usd = match constituents.first() {
            Some(first) => self.holdings.fetch_nav(&first.name).await,
            None => None,
        };

        info!(isin = %isin, constituents = constituents.len(), "Weights read from aggregator page");
        RunState::Done(Ok(WeightsResult {
            isin,
            as_of_date: None,
            constituents,
            nav_usd,
            source_pdf_url: source_url,
            cache_status: CacheStatus::Miss,
            fetched_at: fetched_at.to_rfc3339(),
        }))
    }

    async fn fetch(&self, isin: String, url: String, provider: Provider) -> RunState {
        match self.fetcher.download(&url).await {
            Ok(bytes) => RunState::Extract {
                doc: Document {
                    isin,
                    url,
                    provider,
                    bytes,
                },
            },
            Err(e) => {
                let now = Utc::now();
                let message = e.to_string();
                let http_status = e.http_status();
                warn!(isin = %isin, url = %url, error = %message, "Factsheet download failed");

                self.record(
                    FetchLogEntry::error(&isin, now, &message)
                        .with_http_status(http_status)
                        .with_source_url(&url),
                )
                .await;
                self.remember(Ok(CacheEntry::failure(
                    &isin,
                    &url,
                    now,
                    self.config.failure_ttl(),
                    self.config.parse_version,
                )))
                .await;

                RunState::Done(Err(
                    WorkflowError::new(ErrorCode::FetchFailed, message).with_http_status(http_status)
                ))
            }
        }
    }

    async fn extract(&self, doc: Document) -> RunState {
        match self.extractor.extract_text(&doc.bytes).await {
            Ok(text) => RunState::Parse { doc, text },
            Err(e) => {
                let message = e.to_string();
                warn!(isin = %doc.isin, url = %doc.url, error = %message, "Text extraction failed");
                self.record(
                    FetchLogEntry::error(&doc.isin, Utc::now(), &message).with_source_url(&doc.url),
                )
                .await;
                RunState::Done(Err(WorkflowError::new(ErrorCode::ParseFailed, message)))
            }
        }
    }

    fn parse(doc: Document, text: &str) -> RunState {
        let parsed = parse_factsheet_text(text, doc.provider);
        debug!(
            isin = %doc.isin,
            provider = %doc.provider,
            constituents = parsed.constituents.len(),
            sum = weight_sum(&parsed.constituents),
            "Parsed factsheet text"
        );
        RunState::Escalate {
            doc,
            candidate: Candidate {
                as_of_date: parsed.as_of_date,
                constituents: parsed.constituents,
            },
            previous: None,
        }
    }

    async fn escalate(
        &self,
        doc: Document,
        mut candidate: Candidate,
        previous: Option<Escalation>,
    ) -> RunState {
        let next = escalation::next_escalation(doc.provider, &candidate.constituents, previous);
        match next {
            Escalation::Finish => {
                if let Err(err) = escalation::validate(&candidate.constituents) {
                    warn!(isin = %doc.isin, code = %err.code, message = %err.message, "Extraction rejected");
                    self.record(
                        FetchLogEntry::error(&doc.isin, Utc::now(), &err.message)
                            .with_source_url(&doc.url),
                    )
                    .await;
                    return RunState::Done(Err(err));
                }
                return RunState::Commit { doc, candidate };
            }
            Escalation::VendorHoldings => {
                info!(isin = %doc.isin, "Escalating to vendor holdings");
                if let Some(snapshot) = self.vendor_holdings(&doc.isin).await {
                    if escalation::accept_vendor(&snapshot.constituents) {
                        candidate = Candidate {
                            as_of_date: snapshot.as_of_date.or(candidate.as_of_date),
                            constituents: snapshot.constituents,
                        };
                    }
                }
            }
            Escalation::Ocr => {
                info!(isin = %doc.isin, "Escalating to OCR");
                match self.ocr.extract_via_ocr(&doc.bytes).await {
                    Ok(output) if escalation::accept_ocr(&output.constituents) => {
                        // as-of date stays with the text layer
                        candidate.constituents = output.constituents;
                    }
                    Ok(output) => {
                        debug!(
                            isin = %doc.isin,
                            constituents = output.constituents.len(),
                            "OCR answer not plausible, keeping prior result"
                        );
                    }
                    Err(e) => warn!(isin = %doc.isin, error = %e, "OCR unavailable"),
                }
            }
        }
        RunState::Escalate {
            doc,
            candidate,
            previous: Some(next),
        }
    }

    async fn vendor_holdings(&self, isin: &str) -> Option<HoldingsSnapshot> {
        let ticker = self.holdings.resolve_ticker_from_catalog(isin).await?;
        debug!(isin = %isin, ticker = %ticker, "Catalog ticker found");
        self.holdings.fetch_constituents(&ticker).await
    }

    async fn commit(&self, doc: Document, candidate: Candidate) -> RunState {
        let fetched_at: DateTime<Utc> = Utc::now();
        let sha = hex::encode(Sha256::digest(&doc.bytes));
        let count = candidate.constituents.len();

        self.remember(
            CacheEntry::success(
                &doc.isin,
                &doc.url,
                &candidate.constituents,
                fetched_at,
                self.config.success_ttl(),
                self.config.parse_version,
            )
            .map(|entry| {
                entry
                    .with_as_of_date(candidate.as_of_date.clone())
                    .with_sha256(sha)
            }),
        )
        .await;
        self.record(
            FetchLogEntry::success(&doc.isin, fetched_at)
                .with_message(format!("{} constituents ({})", count, doc.provider))
                .with_http_status(Some(200))
                .with_source_url(&doc.url),
        )
        .await;

        let nav_usd = match ticker_from_factsheet_url(&doc.url) {
            Some(ticker) => self.holdings.fetch_nav(&ticker).await,
            None => None,
        };

        info!(isin = %doc.isin, url = %doc.url, constituents = count, "Weights extracted");
        RunState::Done(Ok(WeightsResult {
            isin: doc.isin,
            as_of_date: candidate.as_of_date,
            constituents: candidate.constituents,
            nav_usd,
            source_pdf_url: doc.url,
            cache_status: CacheStatus::Miss,
            fetched_at: fetched_at.to_rfc3339(),
        }))
    }

    /// Upsert a cache entry; failures are logged and swallowed.
    async fn remember(&self, entry: serde_json::Result<CacheEntry>) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Could not serialize cache entry");
                return;
            }
        };
        if let Err(e) = self.store.upsert_entry(&entry).await {
            warn!(isin = %entry.isin, error = %e, "Cache write failed");
        }
    }

    /// Append to the attempt log; failures are logged and swallowed.
    async fn record(&self, entry: FetchLogEntry) {
        if let Err(e) = self.store.append(&entry).await {
            warn!(isin = %entry.isin, error = %e, "Attempt log write failed");
        }
    }
}

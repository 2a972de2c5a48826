//! Testing utilities including mock implementations.
//!
//! These are useful for testing applications that use the pipeline
//! without making real network calls or needing PDF tooling.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::error::{ExtractError, FetchError, FetchResult, OcrError, ResolveError};
use crate::traits::{
    extractor::{OcrEngine, OcrOutput, TextExtractor},
    fetcher::DocumentFetcher,
    holdings::{HoldingsSnapshot, HoldingsSource},
    resolver::{ResolvedSource, SourceResolver},
    transport::{FetchRequest, Transport},
};

fn network_error(url: &str) -> FetchError {
    FetchError::Network(Box::new(std::io::Error::new(
        std::io::ErrorKind::ConnectionReset,
        format!("connection reset: {}", url),
    )))
}

/// Record of a request made to the mock transport.
#[derive(Debug, Clone, PartialEq)]
pub enum MockRequest {
    Get { url: String },
    Head { url: String },
}

impl MockRequest {
    pub fn url(&self) -> &str {
        match self {
            MockRequest::Get { url } | MockRequest::Head { url } => url,
        }
    }
}

/// A mock transport serving canned bodies and statuses by URL.
///
/// Unknown URLs answer 404. HEAD answers 200 for any URL with a body.
#[derive(Default)]
pub struct MockTransport {
    /// Bodies by URL
    bodies: Arc<RwLock<HashMap<String, Vec<u8>>>>,

    /// Status overrides by URL
    statuses: Arc<RwLock<HashMap<String, u16>>>,

    /// Remaining network failures to inject by URL
    failures: Arc<RwLock<HashMap<String, u32>>>,

    /// Call tracking for assertions
    requests: Arc<RwLock<Vec<MockRequest>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` for `url`.
    pub fn with_body(self, url: impl Into<String>, body: &[u8]) -> Self {
        self.bodies.write().unwrap().insert(url.into(), body.to_vec());
        self
    }

    /// Serve text for `url`.
    pub fn with_text(self, url: impl Into<String>, text: &str) -> Self {
        self.with_body(url, text.as_bytes())
    }

    /// Answer `url` with a fixed status (GET and HEAD).
    pub fn with_status(self, url: impl Into<String>, status: u16) -> Self {
        self.statuses.write().unwrap().insert(url.into(), status);
        self
    }

    /// Fail the next `count` requests to `url` with a network error.
    pub fn with_failures(self, url: impl Into<String>, count: u32) -> Self {
        self.failures.write().unwrap().insert(url.into(), count);
        self
    }

    /// All requests made so far.
    pub fn requests(&self) -> Vec<MockRequest> {
        self.requests.read().unwrap().clone()
    }

    /// URLs of all requests made so far, in order.
    pub fn requested_urls(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| r.url().to_string())
            .collect()
    }

    /// Number of requests made to `url`.
    pub fn request_count(&self, url: &str) -> usize {
        self.requests().iter().filter(|r| r.url() == url).count()
    }

    fn take_failure(&self, url: &str) -> bool {
        let mut failures = self.failures.write().unwrap();
        match failures.get_mut(url) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                true
            }
            _ => false,
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, request: &FetchRequest) -> FetchResult<Vec<u8>> {
        let url = request.url.clone();
        self.requests
            .write()
            .unwrap()
            .push(MockRequest::Get { url: url.clone() });

        if self.take_failure(&url) {
            return Err(network_error(&url));
        }
        if let Some(status) = self.statuses.read().unwrap().get(&url) {
            if !(200..300).contains(status) {
                return Err(FetchError::HttpStatus {
                    url,
                    status: *status,
                });
            }
        }
        let body = self.bodies.read().unwrap().get(&url).cloned();
        match body {
            Some(body) => {
                if let Some(max) = request.max_bytes {
                    if body.len() as u64 > max {
                        return Err(FetchError::TooLarge {
                            size: body.len() as u64,
                            max,
                        });
                    }
                }
                Ok(body)
            }
            None => Err(FetchError::HttpStatus { url, status: 404 }),
        }
    }

    async fn head(&self, url: &str, _timeout: Duration) -> FetchResult<u16> {
        self.requests.write().unwrap().push(MockRequest::Head {
            url: url.to_string(),
        });

        if self.take_failure(url) {
            return Err(network_error(url));
        }
        if let Some(status) = self.statuses.read().unwrap().get(url) {
            return Ok(*status);
        }
        if self.bodies.read().unwrap().contains_key(url) {
            Ok(200)
        } else {
            Ok(404)
        }
    }
}

/// A mock document fetcher with canned documents by URL.
#[derive(Default)]
pub struct MockFetcher {
    documents: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    statuses: Arc<RwLock<HashMap<String, u16>>>,
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `bytes` for `url`.
    pub fn with_document(self, url: impl Into<String>, bytes: &[u8]) -> Self {
        self.documents
            .write()
            .unwrap()
            .insert(url.into(), bytes.to_vec());
        self
    }

    /// Fail `url` with an HTTP status.
    pub fn with_http_failure(self, url: impl Into<String>, status: u16) -> Self {
        self.statuses.write().unwrap().insert(url.into(), status);
        self
    }

    /// URLs downloaded so far.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl DocumentFetcher for MockFetcher {
    async fn download(&self, url: &str) -> FetchResult<Vec<u8>> {
        self.calls.write().unwrap().push(url.to_string());

        if let Some(status) = self.statuses.read().unwrap().get(url) {
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: *status,
            });
        }
        self.documents
            .read()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| network_error(url))
    }
}

/// A mock text extractor mapping document bytes to text.
#[derive(Default)]
pub struct MockTextExtractor {
    texts: Arc<RwLock<HashMap<Vec<u8>, String>>>,
    default_text: Option<String>,
    fail: bool,
    calls: Arc<RwLock<usize>>,
}

impl MockTextExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `text` for documents equal to `bytes`.
    pub fn with_text(self, bytes: &[u8], text: impl Into<String>) -> Self {
        self.texts.write().unwrap().insert(bytes.to_vec(), text.into());
        self
    }

    /// Return `text` for any unknown document.
    pub fn with_default_text(mut self, text: impl Into<String>) -> Self {
        self.default_text = Some(text.into());
        self
    }

    /// Fail every extraction.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn call_count(&self) -> usize {
        *self.calls.read().unwrap()
    }
}

#[async_trait]
impl TextExtractor for MockTextExtractor {
    async fn extract_text(&self, bytes: &[u8]) -> Result<String, ExtractError> {
        *self.calls.write().unwrap() += 1;

        if self.fail {
            return Err(ExtractError::Unreadable {
                primary: "mock primary failure".to_string(),
                secondary: "mock page-by-page failure".to_string(),
            });
        }
        Ok(self
            .texts
            .read()
            .unwrap()
            .get(bytes)
            .cloned()
            .or_else(|| self.default_text.clone())
            .unwrap_or_default())
    }
}

/// A mock OCR engine returning a fixed output.
#[derive(Default)]
pub struct MockOcr {
    output: Option<OcrOutput>,
    fail: bool,
    calls: Arc<RwLock<usize>>,
}

impl MockOcr {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `output` from every call.
    pub fn with_output(mut self, output: OcrOutput) -> Self {
        self.output = Some(output);
        self
    }

    /// Fail every call.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn call_count(&self) -> usize {
        *self.calls.read().unwrap()
    }
}

#[async_trait]
impl OcrEngine for MockOcr {
    async fn extract_via_ocr(&self, _bytes: &[u8]) -> Result<OcrOutput, OcrError> {
        *self.calls.write().unwrap() += 1;

        if self.fail {
            return Err(OcrError::MissingTool("tesseract".to_string()));
        }
        Ok(self.output.clone().unwrap_or_default())
    }
}

/// Record of a call made to the mock holdings source.
#[derive(Debug, Clone, PartialEq)]
pub enum MockHoldingsCall {
    Constituents { ticker: String },
    Nav { ticker: String },
    Catalog { isin: String },
}

/// A mock vendor holdings source.
#[derive(Default)]
pub struct MockHoldings {
    snapshots: Arc<RwLock<HashMap<String, HoldingsSnapshot>>>,
    navs: Arc<RwLock<HashMap<String, f64>>>,
    catalog: Arc<RwLock<HashMap<String, String>>>,
    calls: Arc<RwLock<Vec<MockHoldingsCall>>>,
}

impl MockHoldings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Holdings for a ticker.
    pub fn with_snapshot(self, ticker: impl Into<String>, snapshot: HoldingsSnapshot) -> Self {
        self.snapshots
            .write()
            .unwrap()
            .insert(ticker.into(), snapshot);
        self
    }

    /// NAV for a ticker.
    pub fn with_nav(self, ticker: impl Into<String>, nav: f64) -> Self {
        self.navs.write().unwrap().insert(ticker.into(), nav);
        self
    }

    /// Catalog ticker for an identifier.
    pub fn with_catalog_ticker(self, isin: impl Into<String>, ticker: impl Into<String>) -> Self {
        self.catalog
            .write()
            .unwrap()
            .insert(isin.into(), ticker.into());
        self
    }

    pub fn calls(&self) -> Vec<MockHoldingsCall> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl HoldingsSource for MockHoldings {
    async fn fetch_constituents(&self, ticker: &str) -> Option<HoldingsSnapshot> {
        self.calls
            .write()
            .unwrap()
            .push(MockHoldingsCall::Constituents {
                ticker: ticker.to_string(),
            });
        self.snapshots.read().unwrap().get(ticker).cloned()
    }

    async fn fetch_nav(&self, ticker: &str) -> Option<f64> {
        self.calls.write().unwrap().push(MockHoldingsCall::Nav {
            ticker: ticker.to_string(),
        });
        self.navs.read().unwrap().get(ticker).copied()
    }

    async fn resolve_ticker_from_catalog(&self, isin: &str) -> Option<String> {
        self.calls.write().unwrap().push(MockHoldingsCall::Catalog {
            isin: isin.to_string(),
        });
        self.catalog.read().unwrap().get(isin).cloned()
    }
}

/// A mock resolver with canned sources by identifier.
#[derive(Default)]
pub struct MockResolver {
    sources: Arc<RwLock<HashMap<String, ResolvedSource>>>,
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `isin` to `source`.
    pub fn with_source(self, isin: impl Into<String>, source: ResolvedSource) -> Self {
        self.sources.write().unwrap().insert(isin.into(), source);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl SourceResolver for MockResolver {
    async fn resolve(&self, isin: &str) -> Result<ResolvedSource, ResolveError> {
        self.calls.write().unwrap().push(isin.to_string());
        self.sources
            .read()
            .unwrap()
            .get(isin)
            .cloned()
            .ok_or_else(|| ResolveError::NotFound {
                isin: isin.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_transport_failures_then_body() {
        let transport = MockTransport::new()
            .with_text("https://a.test/x", "hello")
            .with_failures("https://a.test/x", 1);
        let req = FetchRequest::new("https://a.test/x", Duration::from_secs(1));

        assert!(transport.get(&req).await.is_err());
        assert_eq!(transport.get_text(&req).await.unwrap(), "hello");
        assert_eq!(transport.request_count("https://a.test/x"), 2);
    }

    #[tokio::test]
    async fn test_mock_transport_unknown_is_404() {
        let transport = MockTransport::new();
        let req = FetchRequest::new("https://a.test/missing", Duration::from_secs(1));

        let err = transport.get(&req).await.unwrap_err();
        assert_eq!(err.http_status(), Some(404));
        assert_eq!(
            transport.head("https://a.test/missing", Duration::from_secs(1)).await.unwrap(),
            404
        );
    }
}

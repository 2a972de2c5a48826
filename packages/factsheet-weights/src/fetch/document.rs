//! Document fetcher with size cap, timeout and bounded retries.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{FetchError, FetchResult};
use crate::security::AllowList;
use crate::traits::fetcher::DocumentFetcher;
use crate::traits::transport::{FetchRequest, Transport};
use crate::types::config::PipelineConfig;

/// Downloads factsheet documents over a [`Transport`].
///
/// The whole operation is retried on any failure except an allow-list
/// rejection; nothing is kept between attempts.
pub struct HttpDocumentFetcher {
    transport: Arc<dyn Transport>,
    allow_list: AllowList,
    timeout: Duration,
    max_bytes: u64,
    retries: u32,
    retry_delay: Duration,
}

impl HttpDocumentFetcher {
    /// Create a fetcher using the limits from `config`.
    pub fn new(transport: Arc<dyn Transport>, config: &PipelineConfig) -> Self {
        Self {
            transport,
            allow_list: AllowList::new(),
            timeout: config.fetch_timeout(),
            max_bytes: config.max_document_bytes,
            retries: config.fetch_retries,
            retry_delay: config.retry_delay(),
        }
    }

    /// Use a custom allow-list.
    pub fn with_allow_list(mut self, allow_list: AllowList) -> Self {
        self.allow_list = allow_list;
        self
    }
}

#[async_trait]
impl DocumentFetcher for HttpDocumentFetcher {
    async fn download(&self, url: &str) -> FetchResult<Vec<u8>> {
        self.allow_list.assert_allowed(url)?;

        let request = FetchRequest::new(url, self.timeout).with_max_bytes(self.max_bytes);
        let mut last_error: Option<FetchError> = None;

        for attempt in 0..=self.retries {
            match self.transport.get(&request).await {
                Ok(bytes) => {
                    debug!(url = %url, attempt, bytes = bytes.len(), "Document downloaded");
                    return Ok(bytes);
                }
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) => {
                    warn!(url = %url, attempt, error = %e, "Document download failed");
                    last_error = Some(e);
                    if attempt < self.retries {
                        tokio::time::sleep(self.retry_delay).await;
                    }
                }
            }
        }

        Err(last_error.unwrap_or(FetchError::Timeout {
            url: url.to_string(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockTransport;

    const URL: &str = "https://cdn.21shares.com/uploads/current-documents/factsheets/all/Factsheet_HODL.pdf";

    fn config() -> PipelineConfig {
        PipelineConfig::new().with_retry_delay(Duration::ZERO)
    }

    #[tokio::test]
    async fn test_download_success() {
        let transport = Arc::new(MockTransport::new().with_body(URL, b"%PDF-1.7"));
        let fetcher = HttpDocumentFetcher::new(transport.clone(), &config());

        assert_eq!(fetcher.download(URL).await.unwrap(), b"%PDF-1.7");
        assert_eq!(transport.requested_urls().len(), 1);
    }

    #[tokio::test]
    async fn test_retries_then_succeeds() {
        let transport = Arc::new(
            MockTransport::new()
                .with_body(URL, b"%PDF-1.7")
                .with_failures(URL, 2),
        );
        let fetcher = HttpDocumentFetcher::new(transport.clone(), &config());

        assert!(fetcher.download(URL).await.is_ok());
        assert_eq!(transport.requested_urls().len(), 3);
    }

    #[tokio::test]
    async fn test_returns_last_error_after_all_attempts() {
        let transport = Arc::new(MockTransport::new().with_status(URL, 404));
        let fetcher = HttpDocumentFetcher::new(transport.clone(), &config());

        let err = fetcher.download(URL).await.unwrap_err();
        assert_eq!(err.http_status(), Some(404));
        assert_eq!(transport.requested_urls().len(), 3);
    }

    #[tokio::test]
    async fn test_rejects_oversized_document() {
        let transport = Arc::new(MockTransport::new().with_body(URL, &[0u8; 64]));
        let fetcher = HttpDocumentFetcher::new(
            transport,
            &config().with_max_document_bytes(16).with_fetch_retries(0),
        );

        let err = fetcher.download(URL).await.unwrap_err();
        assert!(matches!(err, FetchError::TooLarge { size: 64, max: 16 }));
    }

    #[tokio::test]
    async fn test_disallowed_url_never_requested() {
        let transport = Arc::new(MockTransport::new().with_body("https://example.com/a.pdf", b"x"));
        let fetcher = HttpDocumentFetcher::new(transport.clone(), &config());

        let err = fetcher.download("https://example.com/a.pdf").await.unwrap_err();
        assert!(matches!(err, FetchError::NotAllowed(_)));
        assert!(transport.requested_urls().is_empty());
    }
}

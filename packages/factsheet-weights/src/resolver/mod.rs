//! Factsheet source resolution.
//!
//! Tiers, strictly in order, first success wins:
//!
//! 1. Mapped direct document address
//! 2. Mapped product page, scraped with the provider's link patterns
//! 3. Aggregator profile page (issuer PDF links, URL templates, or a
//!    single-asset answer read off the page itself)
//! 4. 21Shares product catalog
//! 5. 21Shares factsheet listing
//!
//! Tiers 2 to 5 are advisory: every network or parse failure inside a tier
//! is logged and turns into "try the next tier".

pub mod aggregator;
pub mod issuer;
pub mod product_page;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::ResolveError;
use crate::security::AllowList;
use crate::traits::extractor::TextExtractor;
use crate::traits::mapping::MappingSource;
use crate::traits::resolver::{ResolvedSource, SourceResolver};
use crate::traits::transport::{FetchRequest, Transport};
use crate::types::config::PipelineConfig;
use crate::types::provider::Provider;
use crate::vendor::ProductCatalog;

/// The production [`SourceResolver`].
pub struct FactsheetResolver {
    mapping: Arc<dyn MappingSource>,
    transport: Arc<dyn Transport>,
    catalog: ProductCatalog,
    allow_list: AllowList,
    timeout: Duration,
}

impl FactsheetResolver {
    pub fn new(
        mapping: Arc<dyn MappingSource>,
        transport: Arc<dyn Transport>,
        extractor: Arc<dyn TextExtractor>,
        config: &PipelineConfig,
    ) -> Self {
        Self {
            mapping,
            catalog: ProductCatalog::new(transport.clone(), extractor, config),
            transport,
            allow_list: AllowList::new(),
            timeout: config.discovery_timeout(),
        }
    }

    /// Use a custom allow-list for discovered addresses.
    pub fn with_allow_list(mut self, allow_list: AllowList) -> Self {
        self.allow_list = allow_list;
        self
    }

    /// Whether a discovered address may be used.
    fn permitted(&self, url: &str) -> bool {
        let allowed = self.allow_list.is_allowed(url);
        if !allowed {
            debug!(url = %url, "Discovered address is not allow-listed");
        }
        allowed
    }

    /// GET an HTML page, `None` on any failure.
    async fn fetch_page(&self, url: &str) -> Option<String> {
        if !self.permitted(url) {
            return None;
        }
        match self.transport.get_text(&FetchRequest::new(url, self.timeout)).await {
            Ok(html) => Some(html),
            Err(e) => {
                debug!(url = %url, error = %e, "Discovery page unavailable");
                None
            }
        }
    }

    /// HEAD-probe a candidate document address.
    async fn probe(&self, url: &str) -> bool {
        if !self.permitted(url) {
            return false;
        }
        let exists = self.transport.exists(url, self.timeout).await;
        debug!(url = %url, exists, "Probed candidate document");
        exists
    }
}

#[async_trait]
impl SourceResolver for FactsheetResolver {
    async fn resolve(&self, isin: &str) -> Result<ResolvedSource, ResolveError> {
        let entry = self.mapping.lookup(isin);

        if let Some(entry) = &entry {
            let provider = entry.provider();

            if let Some(url) = entry.factsheet() {
                self.allow_list.assert_allowed(url)?;
                info!(isin = %isin, url = %url, "Resolved from mapping");
                return Ok(ResolvedSource::Document {
                    url: url.to_string(),
                    provider,
                });
            }

            if let Some(page) = entry.product_page() {
                if let Some(url) = self.discover_from_product_page(provider, page).await {
                    info!(isin = %isin, url = %url, provider = %provider, "Resolved from product page");
                    return Ok(ResolvedSource::Document { url, provider });
                }
            }
        }

        if let Some(source) = self.discover_from_aggregator(isin).await {
            info!(isin = %isin, source = %source.source_url(), "Resolved from aggregator");
            return Ok(source);
        }

        if let Some(url) = self.discover_from_catalog(isin).await {
            info!(isin = %isin, url = %url, "Resolved from product catalog");
            return Ok(ResolvedSource::Document {
                url,
                provider: Provider::TwentyOneShares,
            });
        }

        if let Some(url) = self.discover_from_listing(isin).await {
            info!(isin = %isin, url = %url, "Resolved from factsheet listing");
            return Ok(ResolvedSource::Document {
                url,
                provider: Provider::TwentyOneShares,
            });
        }

        Err(ResolveError::NotFound {
            isin: isin.to_string(),
        })
    }
}

//! 21Shares-only fallbacks: the product catalog and the factsheet listing.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use super::FactsheetResolver;
use crate::vendor::catalog::{candidate_tickers, exact_ticker, factsheet_url_for_ticker};

pub const LISTING_URL: &str = "https://21shares.com/en-ch/ir/factsheets";

lazy_static! {
    static ref CDN_FACTSHEET_LINK: Regex =
        Regex::new(r#"(?i)href="(https://cdn\.21shares\.com[^"]*Factsheet[^"]*\.pdf)""#).unwrap();
}

impl FactsheetResolver {
    /// Ticker from the catalog, turned into the conventional factsheet
    /// address. A currency-wrapped ticker is trusted as is; otherwise each
    /// candidate address is probed.
    pub(super) async fn discover_from_catalog(&self, isin: &str) -> Option<String> {
        let block = self.catalog.block_for(isin).await?;
        let candidates = candidate_tickers(&block);
        let first = candidates.first()?;

        if exact_ticker(&block).as_ref() == Some(first) {
            let url = factsheet_url_for_ticker(first);
            return self.permitted(&url).then_some(url);
        }

        for ticker in &candidates {
            let url = factsheet_url_for_ticker(ticker);
            if self.probe(&url).await {
                return Some(url);
            }
        }
        debug!(isin = %isin, ?candidates, "No catalog candidate has a factsheet");
        None
    }

    /// First CDN factsheet link on the listing page, if the page mentions
    /// the identifier at all.
    pub(super) async fn discover_from_listing(&self, isin: &str) -> Option<String> {
        let html = self.fetch_page(LISTING_URL).await?;
        if !html.contains(isin) {
            return None;
        }
        CDN_FACTSHEET_LINK
            .captures(&html)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
    }
}

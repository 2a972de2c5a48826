//! Vendor holdings capability.
//!
//! Every operation is advisory: `None` means "try the next strategy",
//! never an error the caller must handle.

use async_trait::async_trait;

use crate::types::constituent::ConstituentWeight;

/// Constituents reported by the vendor endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct HoldingsSnapshot {
    pub constituents: Vec<ConstituentWeight>,
    pub as_of_date: Option<String>,
}

#[async_trait]
pub trait HoldingsSource: Send + Sync {
    /// Normalized constituent weights for a product ticker.
    async fn fetch_constituents(&self, ticker: &str) -> Option<HoldingsSnapshot>;

    /// Net asset value per unit in USD.
    async fn fetch_nav(&self, ticker: &str) -> Option<f64>;

    /// Find the product ticker for an identifier via the issuer catalog.
    async fn resolve_ticker_from_catalog(&self, isin: &str) -> Option<String>;
}

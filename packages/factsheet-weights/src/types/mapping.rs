//! Static per-identifier mapping data.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::ConfigError;
use crate::traits::mapping::MappingSource;
use crate::types::provider::Provider;

/// Externally supplied configuration for one identifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingEntry {
    /// Declared issuer
    #[serde(default)]
    pub provider: Option<Provider>,

    /// Exchange ticker of the product
    #[serde(default)]
    pub ticker: Option<String>,

    /// Product page to scrape for a document link
    #[serde(default)]
    pub product_page_url: Option<String>,

    /// Direct document address
    #[serde(default)]
    pub factsheet_url: Option<String>,
}

impl MappingEntry {
    /// Create an empty entry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the declared provider.
    pub fn with_provider(mut self, provider: Provider) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the product ticker.
    pub fn with_ticker(mut self, ticker: impl Into<String>) -> Self {
        self.ticker = Some(ticker.into());
        self
    }

    /// Set the product page address.
    pub fn with_product_page(mut self, url: impl Into<String>) -> Self {
        self.product_page_url = Some(url.into());
        self
    }

    /// Set the direct document address.
    pub fn with_factsheet(mut self, url: impl Into<String>) -> Self {
        self.factsheet_url = Some(url.into());
        self
    }

    /// Declared provider, or [`Provider::Unknown`].
    pub fn provider(&self) -> Provider {
        self.provider.unwrap_or_default()
    }

    /// Direct document address; blank counts as absent.
    pub fn factsheet(&self) -> Option<&str> {
        non_blank(&self.factsheet_url)
    }

    /// Product page address; blank counts as absent.
    pub fn product_page(&self) -> Option<&str> {
        non_blank(&self.product_page_url)
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Read-only mapping loaded once at start.
#[derive(Debug, Clone, Default)]
pub struct StaticMapping {
    entries: HashMap<String, MappingEntry>,
}

impl StaticMapping {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry (keys are stored uppercase).
    pub fn with_entry(mut self, isin: impl Into<String>, entry: MappingEntry) -> Self {
        self.entries.insert(isin.into().to_uppercase(), entry);
        self
    }

    /// Parse a JSON object keyed by identifier.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let raw: HashMap<String, MappingEntry> = serde_json::from_str(json)?;
        Ok(Self {
            entries: raw
                .into_iter()
                .map(|(k, v)| (k.trim().to_uppercase(), v))
                .collect(),
        })
    }

    /// Load from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Number of mapped identifiers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is mapped.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl MappingSource for StaticMapping {
    fn lookup(&self, isin: &str) -> Option<MappingEntry> {
        self.entries.get(isin).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_urls_count_as_absent() {
        let entry: MappingEntry =
            serde_json::from_str(r#"{ "factsheetUrl": "", "productPageUrl": "   " }"#).unwrap();
        assert_eq!(entry.factsheet(), None);
        assert_eq!(entry.product_page(), None);

        let entry = MappingEntry::new().with_factsheet(" https://www.vaneck.com/f.pdf ");
        assert_eq!(entry.factsheet(), Some("https://www.vaneck.com/f.pdf"));
    }

    #[test]
    fn test_parse_mapping_json() {
        let json = r#"{
            "CH0454664001": {
                "provider": "21shares",
                "ticker": "HODL",
                "productPageUrl": "https://21shares.com/en-ch/product/hodl"
            },
            "de000a27z304": { "provider": "vaneck", "factsheetUrl": null }
        }"#;

        let mapping = StaticMapping::from_json_str(json).unwrap();
        assert_eq!(mapping.len(), 2);

        let hodl = mapping.lookup("CH0454664001").unwrap();
        assert_eq!(hodl.provider(), Provider::TwentyOneShares);
        assert_eq!(hodl.ticker.as_deref(), Some("HODL"));
        assert!(hodl.factsheet_url.is_none());

        let vaneck = mapping.lookup("DE000A27Z304").unwrap();
        assert_eq!(vaneck.provider(), Provider::VanEck);
    }

    #[test]
    fn test_missing_provider_is_unknown() {
        let entry = MappingEntry::new().with_ticker("ABBA");
        assert_eq!(entry.provider(), Provider::Unknown);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            StaticMapping::from_json_str("[1, 2]"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = StaticMapping::from_file("/nonexistent/isin-mapping.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}

//! Single-asset product detection.
//!
//! Eight phrasings, tried in a fixed order. The first hit yields one
//! constituent at 100% and ends extraction for the document.

use lazy_static::lazy_static;
use regex::Regex;

use super::vocabulary::{is_known_ticker, is_single_asset_stopword};
use crate::types::constituent::ConstituentWeight;

lazy_static! {
    /// "100% physically backed by Binance Coin (BNB)"
    static ref BACKED_BY_PARENS: Regex = Regex::new(
        r"100\s*%\s*physically\s+backed\s+by\s+(?:[A-Za-z][A-Za-z ]{0,30}?\s+)?\(([A-Z]{2,10})\)"
    )
    .unwrap();

    /// "100% physically backed by NEAR Protocol"
    static ref BACKED_BY_TICKER: Regex =
        Regex::new(r"100\s*%\s*physically\s+backed\s+by\s+([A-Z]{2,10})(?:\s|$|,|\()").unwrap();

    /// "backed 100% by bitcoin", "fully backed by Bitcoin"
    static ref BACKED_BY_BITCOIN: Regex = Regex::new(
        r"(?i)(?:backed\s+100\s*%|100\s*%\s*backed|fully\s+backed)\s+by\s+(?:bitcoin|Bitcoin|Bitcoin\s*\(BTC\))"
    )
    .unwrap();

    /// "portfolio of Ethereum", "secured by a portfolio\nof DOT"
    static ref PORTFOLIO_OF: Regex = Regex::new(
        r"(?i)(?:portfolio\s+of|secured by\s+(?:a\s+)?portfolio\s+of)\s+(Bitcoin|Ethereum|DOT|Polkadot|Solana|SOL|Cardano|ADA|XRP|Ripple)(?:\s|\.|$)"
    )
    .unwrap();

    /// "Staked Ethereum (ETH) 100%"
    static ref PARENS_TICKER_100: Regex = Regex::new(r"\(([A-Z]{2,10})\)\s+100\s*%?").unwrap();

    /// "fully backed by ETH", "physically backed by the XRP"
    static ref FULLY_BACKED_BY: Regex =
        Regex::new(r"(?i)(?:fully|physically)\s+backed\s+by\s+(?:the\s+)?([A-Z]{2,10})\b").unwrap();

    /// "Compass Crypto Reference Index Ethereum"
    static ref COMPASS_INDEX: Regex = Regex::new(
        r"(?i)Compass\s+Crypto\s+Reference\s+Index\s+(Ethereum|Bitcoin|XRP|Solana|Cardano|Polkadot|Litecoin|Cosmos|ATOM|Tron|Sui)"
    )
    .unwrap();

    /// "100% XRP", "100 % xrp"
    static ref HUNDRED_PERCENT_TICKER: Regex =
        Regex::new(r"(?i)100\s*%\s+([A-Za-z]{2,10})\b").unwrap();
}

fn portfolio_asset_ticker(asset: &str) -> Option<&'static str> {
    match asset {
        "BITCOIN" => Some("BTC"),
        "ETHEREUM" => Some("ETH"),
        "DOT" | "POLKADOT" => Some("DOT"),
        "SOLANA" | "SOL" => Some("SOL"),
        "CARDANO" | "ADA" => Some("ADA"),
        "XRP" | "RIPPLE" => Some("XRP"),
        _ => None,
    }
}

fn compass_index_ticker(asset: &str) -> Option<&'static str> {
    match asset {
        "BITCOIN" => Some("BTC"),
        "ETHEREUM" => Some("ETH"),
        "XRP" => Some("XRP"),
        "SOLANA" => Some("SOL"),
        "CARDANO" => Some("ADA"),
        "POLKADOT" => Some("DOT"),
        "LITECOIN" => Some("LTC"),
        "COSMOS" | "ATOM" => Some("ATOM"),
        "TRON" | "TRX" => Some("TRX"),
        "SUI" => Some("SUI"),
        _ => None,
    }
}

fn capture<'t>(re: &Regex, text: &'t str) -> Option<&'t str> {
    re.captures(text).and_then(|c| c.get(1)).map(|m| m.as_str())
}

/// Detect a single-asset product; `None` when no phrasing applies.
pub fn detect_single_asset(text: &str) -> Option<ConstituentWeight> {
    if let Some(ticker) = capture(&BACKED_BY_PARENS, text) {
        return Some(ConstituentWeight::whole(ticker));
    }

    if let Some(ticker) = capture(&BACKED_BY_TICKER, text) {
        if !is_single_asset_stopword(ticker) {
            return Some(ConstituentWeight::whole(ticker));
        }
    }

    if BACKED_BY_BITCOIN.is_match(text) {
        return Some(ConstituentWeight::whole("BTC"));
    }

    if let Some(asset) = capture(&PORTFOLIO_OF, text) {
        if let Some(ticker) = portfolio_asset_ticker(&asset.to_uppercase()) {
            return Some(ConstituentWeight::whole(ticker));
        }
    }

    if let Some(ticker) = capture(&PARENS_TICKER_100, text) {
        if !is_single_asset_stopword(ticker) && is_known_ticker(ticker) {
            return Some(ConstituentWeight::whole(ticker));
        }
    }

    if let Some(candidate) = capture(&FULLY_BACKED_BY, text) {
        let ticker = candidate.to_uppercase();
        if !is_single_asset_stopword(&ticker) && is_known_ticker(&ticker) {
            return Some(ConstituentWeight::whole(ticker));
        }
    }

    if let Some(asset) = capture(&COMPASS_INDEX, text) {
        if let Some(ticker) = compass_index_ticker(&asset.to_uppercase()) {
            return Some(ConstituentWeight::whole(ticker));
        }
    }

    // Every "100% X" occurrence, not just the first
    HUNDRED_PERCENT_TICKER
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().to_uppercase())
        .find(|t| !is_single_asset_stopword(t) && is_known_ticker(t))
        .map(ConstituentWeight::whole)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticker(text: &str) -> Option<String> {
        detect_single_asset(text).map(|c| {
            assert_eq!(c.weight, 100.0);
            c.name
        })
    }

    #[test]
    fn test_ticker_in_parentheses() {
        assert_eq!(
            ticker("The ETP is 100% physically backed by Binance Coin (BNB) held in cold storage").as_deref(),
            Some("BNB")
        );
        assert_eq!(
            ticker("100% physically backed by (SOL)").as_deref(),
            Some("SOL")
        );
    }

    #[test]
    fn test_bare_ticker_after_backed_by() {
        assert_eq!(
            ticker("100 % physically backed by NEAR Protocol").as_deref(),
            Some("NEAR")
        );
    }

    #[test]
    fn test_backed_by_bitcoin_wording() {
        assert_eq!(ticker("The note is backed 100% by bitcoin.").as_deref(), Some("BTC"));
        assert_eq!(ticker("fully backed by Bitcoin (BTC)").as_deref(), Some("BTC"));
    }

    #[test]
    fn test_portfolio_of_wording() {
        assert_eq!(
            ticker("secured by a portfolio\nof DOT held with a custodian").as_deref(),
            Some("DOT")
        );
        assert_eq!(ticker("a portfolio of Ripple.").as_deref(), Some("XRP"));
    }

    #[test]
    fn test_parenthesised_ticker_then_hundred() {
        assert_eq!(ticker("Staked Ethereum (ETH) 100%").as_deref(), Some("ETH"));
        // not a known ticker
        assert_eq!(ticker("Widget (WDGT) 100%"), None);
    }

    #[test]
    fn test_fully_backed_by_ticker() {
        assert_eq!(
            ticker("Bitwise Ethereum Staking ETP\nThe product is fully backed by ETH tokens").as_deref(),
            Some("ETH")
        );
        assert_eq!(ticker("physically backed by the xrp").as_deref(), Some("XRP"));
    }

    #[test]
    fn test_compass_index() {
        assert_eq!(
            ticker("tracks the Compass Crypto Reference Index Cosmos").as_deref(),
            Some("ATOM")
        );
    }

    #[test]
    fn test_hundred_percent_scans_all_occurrences() {
        assert_eq!(ticker("100% Equity\nZusammensetzung 100 % xrp").as_deref(), Some("XRP"));
    }

    #[test]
    fn test_stopwords_rejected() {
        assert_eq!(ticker("100% physically backed by TOP assets"), None);
        assert_eq!(ticker("100% index"), None);
    }

    #[test]
    fn test_basket_text_has_no_single_asset() {
        assert_eq!(ticker("BTC 52.42%\nETH 24.60%\nXRP 8.33%"), None);
    }
}

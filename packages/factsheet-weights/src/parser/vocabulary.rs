//! Word lists shared by every extraction strategy.

use lazy_static::lazy_static;
use std::collections::HashSet;

/// Names containing any of these (case-insensitive) are never assets.
const BLACKLIST_KEYWORDS: &[&str] = &[
    "TER", "fee", "management", "total", "performance", "volatility", "isin", "currency",
    "expense", "Ongoing", "Charges", "of", "by", "Since", "Allocation", "Asset", "Underlying",
    "Percentage", "Benchmark", "Physically", "January", "February", "March", "April", "May",
    "June", "July", "August", "September", "October", "November", "December", "Days", "Months",
    "Year", "YTD", "inception", "Change", "Jan", "Feb", "Mar", "Apr", "Jun", "Jul", "Aug", "Sep",
    "Oct", "Nov", "Dec", "2022", "2023", "2024", "2025", "2026",
];

/// Words that look like tickers after "backed by" but are not.
const SINGLE_ASSET_STOPWORDS: &[&str] = &["the", "underlying", "digital", "assets", "top", "index"];

/// Substrings marking a precious-metal holding.
const COMMODITY_MARKERS: &[&str] = &["GOLD", "XAU", "SILVER", "XAG"];

lazy_static! {
    static ref BLACKLIST_LOWER: Vec<String> =
        BLACKLIST_KEYWORDS.iter().map(|k| k.to_lowercase()).collect();

    /// Tickers and asset names (uppercase) accepted as crypto holdings.
    pub static ref KNOWN_CRYPTO_TICKERS: HashSet<&'static str> = [
        "BTC", "BITCOIN", "ETH", "ETHEREUM", "XRP", "RIPPLE", "BNB", "BINANCE",
        "SOL", "SOLANA", "ADA", "CARDANO", "DOGE", "DOGECOIN", "AVAX", "AVALANCHE",
        "DOT", "POLKADOT", "MATIC", "POLYGON", "LINK", "CHAINLINK", "UNI", "UNISWAP",
        "LTC", "LITECOIN", "ATOM", "COSMOS", "NEAR", "APT", "APTOS", "ARB", "ARBITRUM",
        "OP", "OPTIMISM", "SUI", "INJ", "INJECTIVE", "TIA", "CELESTIA", "STX", "STACKS",
        "FIL", "FILECOIN", "ICP", "HBAR", "HEDERA", "VET", "VECHAIN", "ALGO", "ALGORAND",
        "XLM", "STELLAR", "AAVE", "MKR", "MAKER", "CRV", "CURVE", "LDO", "LIDO",
        "TON", "TONCOIN", "SHIB", "TRX", "TRON", "BCH", "BITCOIN CASH",
        // index products listed as their own line
        "VCLD", "DA20",
    ]
    .into_iter()
    .collect();

    /// Precious metals that appear next to crypto in mixed products.
    pub static ref KNOWN_COMMODITY_ASSETS: HashSet<&'static str> =
        ["GOLD", "XAU", "SILVER", "XAG", "PHYSICAL GOLD", "PHYSICAL SILVER"]
            .into_iter()
            .collect();
}

/// Case-insensitive substring match against the blacklist.
pub fn is_blacklisted(name: &str) -> bool {
    let lower = name.trim().to_lowercase();
    BLACKLIST_LOWER.iter().any(|kw| lower.contains(kw.as_str()))
}

/// Whether a ticker candidate is a filler word.
pub fn is_single_asset_stopword(candidate: &str) -> bool {
    let lower = candidate.to_lowercase();
    SINGLE_ASSET_STOPWORDS.contains(&lower.as_str())
}

/// Exact membership in the known crypto set (input must be uppercase).
pub fn is_known_ticker(upper: &str) -> bool {
    KNOWN_CRYPTO_TICKERS.contains(upper)
}

/// Exact or substring match against the known crypto set (uppercase input).
pub fn mentions_crypto(upper: &str) -> bool {
    is_known_ticker(upper) || KNOWN_CRYPTO_TICKERS.iter().any(|t| upper.contains(t))
}

/// Exact or substring match against the commodity markers (uppercase input).
pub fn is_commodity(upper: &str) -> bool {
    KNOWN_COMMODITY_ASSETS.contains(upper) || COMMODITY_MARKERS.iter().any(|m| upper.contains(m))
}

/// 2 to 10 uppercase ASCII letters.
pub fn is_ticker_shaped(upper: &str) -> bool {
    (2..=10).contains(&upper.len()) && upper.chars().all(|c| c.is_ascii_uppercase())
}

/// Parse a captured weight with `,` or `.` as decimal separator.
pub fn parse_weight(raw: &str) -> f64 {
    raw.replacen(',', ".", 1).parse::<f64>().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blacklist_is_case_insensitive_substring() {
        assert!(is_blacklisted("TER"));
        assert!(is_blacklisted("management fee"));
        assert!(is_blacklisted("Total Expense Ratio"));
        assert!(is_blacklisted("  ytd "));
        assert!(is_blacklisted("Jan 2025"));
        assert!(!is_blacklisted("BTC"));
        assert!(!is_blacklisted("Ethereum"));
    }

    #[test]
    fn test_crypto_and_commodity_sets() {
        assert!(is_known_ticker("BTC"));
        assert!(!is_known_ticker("btc"));
        assert!(mentions_crypto("BITCOIN CASH"));
        assert!(mentions_crypto("STAKED ETH"));
        assert!(is_commodity("PHYSICAL GOLD"));
        assert!(is_commodity("GOLD BULLION"));
        assert!(!is_commodity("PLATINUM"));
    }

    #[test]
    fn test_ticker_shape() {
        assert!(is_ticker_shaped("BTC"));
        assert!(is_ticker_shaped("SOLANAETFS"));
        assert!(!is_ticker_shaped("B"));
        assert!(!is_ticker_shaped("Btc"));
        assert!(!is_ticker_shaped("BTC1"));
    }

    #[test]
    fn test_parse_weight() {
        assert_eq!(parse_weight("52.42"), 52.42);
        assert_eq!(parse_weight("24,6"), 24.6);
        assert_eq!(parse_weight("7"), 7.0);
    }
}

//! One extraction strategy per provider, dispatched through a table.

use lazy_static::lazy_static;
use regex::Regex;

use super::section::extract_relevant_section;
use super::single_asset::detect_single_asset;
use super::table::{extract_asset_rows, extract_from_block, DDA_ROW, VANECK_ROW};
use crate::types::constituent::ConstituentWeight;
use crate::types::provider::Provider;

lazy_static! {
    /// Mixed-case asset names after "physically backed by" (CoinShares KIDs).
    static ref COINSHARES_BACKED_BY: Regex = Regex::new(
        r"(?i)(?:100\s*%\s*)?physically\s+backed\s+by\s+(cosmos|bitcoin|ethereum|xrp|solana|cardano|polkadot|litecoin|avalanche|polygon|chainlink|near\s+protocol|toncoin|tron|sui)(?:\s*\([A-Z]{2,10}\))?"
    )
    .unwrap();

    static ref INNER_WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Constituent extraction for one issuer's document layout.
pub trait ExtractionStrategy: Send + Sync {
    fn extract(&self, text: &str) -> Vec<ConstituentWeight>;
}

/// Single-asset detection, then the generic extractor over the
/// provider's section.
struct SectionStrategy(Provider);

/// Single-asset, then capitalised `name pct%` rows over the whole
/// text, then the generic extractor over the section.
struct VanEckStrategy;

/// Single-asset, then ticker-shaped rows over the section, then the
/// generic extractor over the same section.
struct DdaStrategy;

/// Single-asset, then the mixed-case "backed by" wording, then the
/// generic extractor over the section.
struct CoinSharesStrategy;

fn single(text: &str) -> Option<Vec<ConstituentWeight>> {
    detect_single_asset(text).map(|c| vec![c])
}

impl ExtractionStrategy for SectionStrategy {
    fn extract(&self, text: &str) -> Vec<ConstituentWeight> {
        single(text).unwrap_or_else(|| {
            extract_from_block(extract_relevant_section(text, self.0), false)
        })
    }
}

impl ExtractionStrategy for VanEckStrategy {
    fn extract(&self, text: &str) -> Vec<ConstituentWeight> {
        if let Some(found) = single(text) {
            return found;
        }
        let rows = extract_asset_rows(&VANECK_ROW, text, false);
        if !rows.is_empty() {
            return rows;
        }
        extract_from_block(extract_relevant_section(text, Provider::VanEck), false)
    }
}

impl ExtractionStrategy for DdaStrategy {
    fn extract(&self, text: &str) -> Vec<ConstituentWeight> {
        if let Some(found) = single(text) {
            return found;
        }
        let section = extract_relevant_section(text, Provider::Dda);
        let rows = extract_asset_rows(&DDA_ROW, section, true);
        if !rows.is_empty() {
            return rows;
        }
        extract_from_block(section, false)
    }
}

fn coinshares_backed_ticker(name: &str) -> Option<&'static str> {
    let lower = INNER_WHITESPACE.replace_all(name, " ").to_lowercase();
    match lower.as_str() {
        "cosmos" => Some("ATOM"),
        "bitcoin" => Some("BTC"),
        "ethereum" => Some("ETH"),
        "xrp" => Some("XRP"),
        "solana" => Some("SOL"),
        "cardano" => Some("ADA"),
        "polkadot" => Some("DOT"),
        "litecoin" => Some("LTC"),
        "avalanche" => Some("AVAX"),
        "polygon" => Some("MATIC"),
        "chainlink" => Some("LINK"),
        "near protocol" => Some("NEAR"),
        "toncoin" => Some("TON"),
        "tron" => Some("TRX"),
        "sui" => Some("SUI"),
        _ => None,
    }
}

impl ExtractionStrategy for CoinSharesStrategy {
    fn extract(&self, text: &str) -> Vec<ConstituentWeight> {
        if let Some(found) = single(text) {
            return found;
        }
        let backed = COINSHARES_BACKED_BY
            .captures(text)
            .and_then(|c| c.get(1))
            .and_then(|m| coinshares_backed_ticker(m.as_str()));
        if let Some(ticker) = backed {
            return vec![ConstituentWeight::whole(ticker)];
        }
        extract_from_block(extract_relevant_section(text, Provider::CoinShares), false)
    }
}

/// Provider → strategy. Adding an issuer means adding one row.
static STRATEGIES: &[(Provider, &dyn ExtractionStrategy)] = &[
    (Provider::TwentyOneShares, &SectionStrategy(Provider::TwentyOneShares)),
    (Provider::VanEck, &VanEckStrategy),
    (Provider::Bitwise, &SectionStrategy(Provider::Bitwise)),
    (Provider::Dda, &DdaStrategy),
    (Provider::CoinShares, &CoinSharesStrategy),
    (Provider::WisdomTree, &SectionStrategy(Provider::WisdomTree)),
    (Provider::JustEtf, &SectionStrategy(Provider::JustEtf)),
    (Provider::Unknown, &SectionStrategy(Provider::Unknown)),
];

static FALLBACK: SectionStrategy = SectionStrategy(Provider::Unknown);

/// Strategy registered for `provider`.
pub fn strategy_for(provider: Provider) -> &'static dyn ExtractionStrategy {
    STRATEGIES
        .iter()
        .find(|(p, _)| *p == provider)
        .map(|(_, s)| *s)
        .unwrap_or(&FALLBACK)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(rows: &[ConstituentWeight]) -> Vec<&str> {
        rows.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_every_provider_has_a_strategy() {
        for provider in Provider::ALL {
            assert!(STRATEGIES.iter().any(|(p, _)| *p == provider), "{}", provider);
        }
    }

    #[test]
    fn test_vaneck_table_over_whole_text() {
        let text = "VanEck Crypto Leaders ETN\nBitcoin 60.00%\nEthereum 30.00%\nSolana 10.00%\nTER 0.95%";
        let rows = strategy_for(Provider::VanEck).extract(text);
        assert_eq!(names(&rows), vec!["Bitcoin", "Ethereum", "Solana"]);
    }

    #[test]
    fn test_dda_ticker_rows_in_section() {
        let text = "Fund facts\nNAV 12.3%\nIndex Constituents\nBTC 70.50%\nETH 20.25%\nNEWC 9.25%\nDisclaimer";
        let rows = strategy_for(Provider::Dda).extract(text);
        assert_eq!(names(&rows), vec!["BTC", "ETH", "NEWC"]);
    }

    #[test]
    fn test_coinshares_mixed_case_backed_by() {
        let text = "CoinShares Physical Near\nThe product is physically backed by Near Protocol.";
        let rows = strategy_for(Provider::CoinShares).extract(text);
        assert_eq!(rows, vec![ConstituentWeight::whole("NEAR")]);
    }

    #[test]
    fn test_coinshares_names_normalize_whitespace() {
        assert_eq!(coinshares_backed_ticker("Near \n Protocol"), Some("NEAR"));
        assert_eq!(coinshares_backed_ticker("COSMOS"), Some("ATOM"));
        assert_eq!(coinshares_backed_ticker("Gold"), None);
    }

    #[test]
    fn test_section_strategy_uses_provider_headers() {
        let text = "Performance 12.5%\nZusammensetzung\nBTC 80%\nETH 20%";
        let rows = strategy_for(Provider::Bitwise).extract(text);
        assert_eq!(names(&rows), vec!["BTC", "ETH"]);
    }
}

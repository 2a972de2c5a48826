//! Factsheet text parsing.
//!
//! A pure function over extracted text: find the as-of date, run the
//! provider's extraction strategy, normalize plausible sums to 100 and,
//! as a last resort, look for exactly one coin mentioned anywhere in the
//! document.

pub mod date;
pub mod full_text;
pub mod providers;
pub mod section;
pub mod single_asset;
pub mod table;
pub mod vocabulary;

use serde::{Deserialize, Serialize};

pub use date::extract_as_of_date;
pub use providers::{strategy_for, ExtractionStrategy};
pub use single_asset::detect_single_asset;

use crate::types::constituent::{is_plausible, normalize_to_100, ConstituentWeight};
use crate::types::provider::Provider;

/// Result of parsing one document's text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedFactsheet {
    pub as_of_date: Option<String>,
    pub constituents: Vec<ConstituentWeight>,
}

/// Parse factsheet text using the rules for `provider`.
pub fn parse_factsheet_text(text: &str, provider: Provider) -> ParsedFactsheet {
    let as_of_date = extract_as_of_date(text);
    let mut constituents = normalize_to_100(strategy_for(provider).extract(text));

    if !is_plausible(&constituents) {
        if let Some(coin) = full_text::single_coin_from_full_text(text) {
            constituents = vec![coin];
        }
    }

    ParsedFactsheet {
        as_of_date,
        constituents,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::constituent::weight_sum;

    #[test]
    fn test_dated_basket_with_implausible_sum_is_kept() {
        let text = "As of 15 January 2025\nBTC 52.42%\nEthereum 24.60%\nXRP 8.33%";
        let parsed = parse_factsheet_text(text, Provider::Unknown);

        assert_eq!(parsed.as_of_date.as_deref(), Some("15 January 2025"));
        assert_eq!(parsed.constituents.len(), 3);
        assert_eq!(parsed.constituents[0].name, "BTC");
        assert!(parsed.constituents[0].weight > 50.0);
    }

    #[test]
    fn test_bitwise_single_asset() {
        let text = "Bitwise Ethereum Staking ETP\nThe product is fully backed by ETH tokens held in custody.";
        let parsed = parse_factsheet_text(text, Provider::Bitwise);

        assert_eq!(parsed.constituents, vec![ConstituentWeight::whole("ETH")]);
    }

    #[test]
    fn test_fee_lines_never_become_constituents() {
        let text = "TER 0.99%\nmanagement fee 0.50%\nBTC 52.42%\nEthereum 24.60%";
        for provider in Provider::ALL {
            let parsed = parse_factsheet_text(text, provider);
            let names: Vec<&str> = parsed.constituents.iter().map(|c| c.name.as_str()).collect();

            assert!(!names.contains(&"TER"), "{}: {:?}", provider, names);
            assert!(!names.iter().any(|n| n.contains("management")), "{}", provider);
            assert!(names.contains(&"BTC"), "{}: {:?}", provider, names);
            assert!(names.contains(&"Ethereum"), "{}: {:?}", provider, names);
        }
    }

    #[test]
    fn test_basket_sums_to_hundred() {
        let parsed = parse_factsheet_text("BTC 50%\nETH 30%\nXRP 20%", Provider::Unknown);
        assert!((weight_sum(&parsed.constituents) - 100.0).abs() < 0.1);
    }

    #[test]
    fn test_plausible_sum_is_rescaled() {
        let parsed = parse_factsheet_text("BTC 60%\nETH 35%", Provider::Unknown);
        assert_eq!(parsed.constituents[0].weight, 63.16);
        assert_eq!(parsed.constituents[1].weight, 36.84);
    }

    #[test]
    fn test_single_asset_output_reparses_to_itself() {
        for text in ["BTC 100%", "100% BTC"] {
            let parsed = parse_factsheet_text(text, Provider::Unknown);
            assert_eq!(parsed.constituents, vec![ConstituentWeight::whole("BTC")], "{}", text);
        }
    }

    #[test]
    fn test_full_text_fallback_when_nothing_extracted() {
        let text = "The Solana staking product\nOngoing charges 0.95%";
        let parsed = parse_factsheet_text(text, Provider::TwentyOneShares);
        assert_eq!(parsed.constituents, vec![ConstituentWeight::whole("SOL")]);
    }

    #[test]
    fn test_no_text_no_constituents() {
        assert_eq!(parse_factsheet_text("", Provider::Unknown), ParsedFactsheet::default());
    }
}

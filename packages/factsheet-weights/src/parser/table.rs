//! Weight-line extraction from a block of text.

use lazy_static::lazy_static;
use regex::Regex;
use std::cmp::Ordering;

use super::vocabulary::{
    is_blacklisted, is_commodity, is_ticker_shaped, mentions_crypto, parse_weight,
};
use crate::types::constituent::ConstituentWeight;

/// Most constituents returned from one extraction.
pub const MAX_CONSTITUENTS: usize = 20;

lazy_static! {
    /// Name-like prefix (<= 41 chars) followed by a number, optional `%`.
    static ref WEIGHT_LINE: Regex =
        Regex::new(r"([A-Za-z0-9][A-Za-z0-9 \-.()]{1,40})\s+(\d{1,3}(?:[.,]\d{1,4})?)\s*%?").unwrap();

    /// Capitalised name, number, mandatory `%` (VanEck index tables).
    pub(crate) static ref VANECK_ROW: Regex =
        Regex::new(r"\b([A-Z][A-Za-z0-9 ]{1,20})\s+(\d{1,3}(?:[.,]\d{1,2})?)\s*%").unwrap();

    /// "Bitcoin BTC 45.23%" style rows (DDA baskets).
    pub(crate) static ref DDA_ROW: Regex =
        Regex::new(r"\b([A-Z][A-Za-z0-9 ]{1,25})\s+(\d{1,3}(?:[.,]\d{1,2})?)\s*%").unwrap();
}

fn by_weight_desc(a: &ConstituentWeight, b: &ConstituentWeight) -> Ordering {
    b.weight.partial_cmp(&a.weight).unwrap_or(Ordering::Equal)
}

fn finish(mut rows: Vec<ConstituentWeight>) -> Vec<ConstituentWeight> {
    rows.sort_by(by_weight_desc);
    rows.truncate(MAX_CONSTITUENTS);
    rows
}

/// (name, weight) pairs from every match of `pattern`, minus blacklisted
/// names and weights outside (0, 100].
fn candidate_rows<'a>(
    pattern: &'a Regex,
    block: &'a str,
) -> impl Iterator<Item = ConstituentWeight> + 'a {
    pattern.captures_iter(block).filter_map(|caps| {
        let name = caps.get(1)?.as_str().trim();
        let weight = parse_weight(caps.get(2)?.as_str());
        if is_blacklisted(name) || weight <= 0.0 || weight > 100.0 {
            return None;
        }
        Some(ConstituentWeight::new(name, weight))
    })
}

/// Generic extraction over a block.
///
/// With `require_ticker`, long names (> 12 chars) that are neither
/// ticker-like, known crypto nor a commodity are dropped as well.
pub fn extract_from_block(block: &str, require_ticker: bool) -> Vec<ConstituentWeight> {
    let rows = candidate_rows(&WEIGHT_LINE, block)
        .filter(|row| {
            if !require_ticker {
                return true;
            }
            let upper = row.name.to_uppercase();
            let looks_like_ticker = is_ticker_shaped(&upper) || mentions_crypto(&upper);
            looks_like_ticker || is_commodity(&upper) || row.name.chars().count() <= 12
        })
        .collect();
    finish(rows)
}

/// Rows from `pattern` whose name is a crypto asset or a commodity.
///
/// `allow_ticker_shape` also admits any 2-10 letter uppercase name.
pub fn extract_asset_rows(
    pattern: &Regex,
    block: &str,
    allow_ticker_shape: bool,
) -> Vec<ConstituentWeight> {
    let rows = candidate_rows(pattern, block)
        .filter(|row| {
            let upper = row.name.to_uppercase();
            let is_crypto = (allow_ticker_shape && is_ticker_shaped(&upper)) || mentions_crypto(&upper);
            is_crypto || is_commodity(&upper)
        })
        .collect();
    finish(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(rows: &[ConstituentWeight]) -> Vec<&str> {
        rows.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_generic_rows_sorted_desc() {
        let rows = extract_from_block("XRP 8.33%\nBTC 52.42%\nEthereum 24,60 %", false);

        assert_eq!(names(&rows), vec!["BTC", "Ethereum", "XRP"]);
        assert_eq!(rows[1].weight, 24.6);
    }

    #[test]
    fn test_generic_drops_blacklisted_and_out_of_range() {
        let rows = extract_from_block("TER 0.99%\nmanagement fee 0.50%\nBTC 52.42%\nFOO 0%\nBAR 250%", false);
        assert_eq!(names(&rows), vec!["BTC"]);
    }

    #[test]
    fn test_require_ticker_drops_long_prose() {
        let block = "Unlisted basket component 12.5%\nBTC 50%";
        assert_eq!(extract_from_block(block, false).len(), 2);
        assert_eq!(names(&extract_from_block(block, true)), vec!["BTC"]);
    }

    #[test]
    fn test_truncates_to_twenty() {
        let block: String = (1..=25).map(|i| format!("C{} {}%\n", i, i)).collect();
        let rows = extract_from_block(&block, false);
        assert_eq!(rows.len(), MAX_CONSTITUENTS);
        assert_eq!(rows[0].weight, 25.0);
    }

    #[test]
    fn test_asset_rows_keep_crypto_and_metals() {
        let text = "Bitcoin 45.00%\nGold 30.00%\nCash 25.00%";
        let rows = extract_asset_rows(&VANECK_ROW, text, false);
        assert_eq!(names(&rows), vec!["Bitcoin", "Gold"]);
    }

    #[test]
    fn test_asset_rows_ticker_shape() {
        let text = "NEWC 10.00%\nBTC 90.00%";
        assert_eq!(extract_asset_rows(&DDA_ROW, text, true).len(), 2);
        assert_eq!(extract_asset_rows(&DDA_ROW, text, false).len(), 1);
    }
}

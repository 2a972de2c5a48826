//! Section localization: narrow the text to the allocation table.

use lazy_static::lazy_static;
use regex::Regex;

use crate::types::provider::Provider;

/// Characters kept after a header.
const SECTION_WINDOW_CHARS: usize = 2500;

/// Characters kept when no next-section marker follows the header.
const SECTION_FALLBACK_CHARS: usize = 1500;

lazy_static! {
    static ref NEXT_SECTION: Regex = Regex::new(
        r"(?i)\n\s*(TRADING|FUNDAMENTALS|RISK|HISTORICAL|ABOUT|CONTACT|DISCLAIMER|21shares\.com|vaneck\.com|etc-group\.com|bitwiseinvestments\.eu|deutschedigitalassets\.com)"
    )
    .unwrap();
}

/// Ordered header phrases per provider.
pub fn section_headers(provider: Provider) -> &'static [&'static str] {
    match provider {
        Provider::TwentyOneShares => &[
            "ASSET ALLOCATION",
            "Asset Allocation",
            "INDEX COMPOSITION",
            "Index Composition",
            "PORTFOLIO",
            "Portfolio",
            "WEIGHTING",
            "Constituents",
        ],
        Provider::VanEck => &[
            "Index Composition",
            "INDEX COMPOSITION",
            "Portfolio Composition",
            "PORTFOLIO COMPOSITION",
            "Asset Allocation",
            "ASSET ALLOCATION",
            "Holdings",
            "HOLDINGS",
            "Constituents",
            "CONSTITUENTS",
            "Top Holdings",
        ],
        Provider::Bitwise => &[
            "Zusammensetzung",
            "Index-Zusammensetzung",
            "Indexzusammensetzung",
            "Index Composition",
            "INDEX COMPOSITION",
            "Asset Allocation",
            "ASSET ALLOCATION",
            "Portfolio",
            "PORTFOLIO",
            "Holdings",
            "HOLDINGS",
            "Constituents",
            "CONSTITUENTS",
            "Underlying Assets",
        ],
        Provider::CoinShares => &[
            "Index Composition",
            "INDEX COMPOSITION",
            "Asset Allocation",
            "Underlying asset",
            "Holdings",
            "HOLDINGS",
        ],
        Provider::WisdomTree => &[
            "Index Composition",
            "Asset Allocation",
            "Underlying",
            "Holdings",
            "HOLDINGS",
        ],
        Provider::JustEtf => &[
            "ASSET ALLOCATION",
            "Asset Allocation",
            "INDEX COMPOSITION",
            "Index Composition",
            "Portfolio",
            "Holdings",
        ],
        Provider::Dda => &[
            "Index Constituents",
            "INDEX CONSTITUENTS",
            "Asset Allocation",
            "ASSET ALLOCATION",
            "Portfolio Allocation",
            "PORTFOLIO ALLOCATION",
            "Holdings",
            "HOLDINGS",
            "Constituents",
            "CONSTITUENTS",
            "Index Composition",
            "Crypto Allocation",
        ],
        Provider::Unknown => &[
            "ASSET ALLOCATION",
            "Asset Allocation",
            "INDEX COMPOSITION",
            "Index Composition",
            "PORTFOLIO",
            "Portfolio",
            "WEIGHTING",
            "Constituents",
            "Holdings",
            "HOLDINGS",
        ],
    }
}

/// Byte prefix of `s` holding at most `max_chars` characters.
pub(crate) fn take_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// The window after the first matching header, or the whole text.
///
/// Headers are tried in list order; the first one found anywhere in the
/// text wins. The window ends at the next-section marker if one occurs
/// inside it, otherwise it is cut to a shorter fallback length.
pub fn extract_relevant_section(text: &str, provider: Provider) -> &str {
    for header in section_headers(provider) {
        if let Some(idx) = text.find(header) {
            let rest = take_chars(&text[idx + header.len()..], SECTION_WINDOW_CHARS);
            return match NEXT_SECTION.find(rest) {
                Some(m) => &rest[..m.start()],
                None => take_chars(rest, SECTION_FALLBACK_CHARS),
            };
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cuts_at_next_section() {
        let text = "Intro 99%\nASSET ALLOCATION\nBTC 60%\nETH 40%\nRISK FACTORS\nXYZ 12%";
        let section = extract_relevant_section(text, Provider::TwentyOneShares);

        assert_eq!(section, "\nBTC 60%\nETH 40%");
    }

    #[test]
    fn test_header_priority_is_list_order() {
        // "Holdings" appears first in the text, but "Index Composition"
        // comes first in the VanEck list.
        let text = "Holdings\nfoo 1%\nIndex Composition\nBTC 100%";
        let section = extract_relevant_section(text, Provider::VanEck);
        assert!(section.starts_with("\nBTC 100%"));
    }

    #[test]
    fn test_fallback_window_without_marker() {
        let filler = "x".repeat(3000);
        let text = format!("Portfolio{}", filler);
        let section = extract_relevant_section(&text, Provider::Unknown);
        assert_eq!(section.chars().count(), 1500);
    }

    #[test]
    fn test_no_header_returns_whole_text() {
        let text = "BTC 50%\nETH 50%";
        assert_eq!(extract_relevant_section(text, Provider::Unknown), text);
    }

    #[test]
    fn test_multibyte_window_is_char_safe() {
        let text = format!("Asset Allocation{}", "ä".repeat(3000));
        let section = extract_relevant_section(&text, Provider::TwentyOneShares);
        assert_eq!(section.chars().count(), 1500);
    }
}

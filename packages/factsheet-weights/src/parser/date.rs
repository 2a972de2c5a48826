//! As-of date detection.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Tried in order; the first match wins.
    static ref AS_OF_PATTERNS: Vec<Regex> = [
        r"[Aa]s of\s+(\d{1,2}\s+[A-Za-z]+,?\s*\d{4})",
        r"[Aa]s of\s+(\d{1,2}[./-]\d{1,2}[./-]\d{2,4})",
        r"[Ss]tand\s+(\d{1,2}[./-]\d{1,2}[./-]\d{2,4})",
        r"[Dd]atum[:\s]+(\d{1,2}[./-]\d{1,2}[./-]\d{2,4})",
        r"[Dd]ate[:\s]+(\d{1,2}[./-]\d{1,2}[./-]\d{2,4})",
        r"[Rr]ebalancing[:\s]+(\d{1,2}[./-]\d{1,2}[./-]\d{2,4})",
        r"(?i)[Pp]ortfolio\s+(?:date|as of)[:\s]+(\d{1,2}[./-]\d{1,2}[./-]\d{2,4})",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect();

    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// First as-of date phrase in `text`, whitespace-collapsed.
pub fn extract_as_of_date(text: &str) -> Option<String> {
    AS_OF_PATTERNS.iter().find_map(|pattern| {
        pattern
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| WHITESPACE.replace_all(m.as_str().trim(), " ").into_owned())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_month() {
        assert_eq!(
            extract_as_of_date("As of 15 January 2025\nBTC 52.42%").as_deref(),
            Some("15 January 2025")
        );
        assert_eq!(
            extract_as_of_date("Data as of 3   March, 2024").as_deref(),
            Some("3 March, 2024")
        );
    }

    #[test]
    fn test_numeric_formats() {
        assert_eq!(extract_as_of_date("as of 31.12.2024").as_deref(), Some("31.12.2024"));
        assert_eq!(extract_as_of_date("Stand 02/01/25").as_deref(), Some("02/01/25"));
        assert_eq!(extract_as_of_date("Datum: 1-2-2025").as_deref(), Some("1-2-2025"));
        assert_eq!(
            extract_as_of_date("Next Rebalancing: 30.06.2025").as_deref(),
            Some("30.06.2025")
        );
        assert_eq!(
            extract_as_of_date("PORTFOLIO AS OF 28.02.2025").as_deref(),
            Some("28.02.2025")
        );
    }

    #[test]
    fn test_priority_order() {
        // "as of" beats an earlier "Date:" phrase
        let text = "Date: 01.01.2024\nweights as of 15.01.2025";
        assert_eq!(extract_as_of_date(text).as_deref(), Some("15.01.2025"));
    }

    #[test]
    fn test_no_date() {
        assert_eq!(extract_as_of_date("BTC 100%"), None);
    }
}

//! Whole-document single-coin fallback.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

use crate::types::constituent::ConstituentWeight;

lazy_static! {
    /// (pattern, ticker). Multi-word names come before their prefixes.
    /// Names match case-insensitively, tickers only in uppercase.
    static ref COIN_MENTIONS: Vec<(Regex, &'static str)> = [
        (r"(?i)\bbitcoin\s+cash\b", "BCH"),
        (r"(?i)\bnear\s+protocol\b", "NEAR"),
        (r"(?i)\binternet\s+computer\b", "ICP"),
        (r"(?i)\bbitcoin\b", "BTC"),
        (r"\bBTC\b", "BTC"),
        (r"(?i)\bethereum\b", "ETH"),
        (r"\bETH\b", "ETH"),
        (r"(?i)\bcosmos\b", "ATOM"),
        (r"\bATOM\b", "ATOM"),
        (r"(?i)\bripple\b", "XRP"),
        (r"\bXRP\b", "XRP"),
        (r"(?i)\bsolana\b", "SOL"),
        (r"\bSOL\b", "SOL"),
        (r"(?i)\bcardano\b", "ADA"),
        (r"\bADA\b", "ADA"),
        (r"(?i)\bpolkadot\b", "DOT"),
        (r"\bDOT\b", "DOT"),
        (r"(?i)\blitecoin\b", "LTC"),
        (r"\bLTC\b", "LTC"),
        (r"(?i)\bavalanche\b", "AVAX"),
        (r"\bAVAX\b", "AVAX"),
        (r"(?i)\bpolygon\b", "MATIC"),
        (r"\bMATIC\b", "MATIC"),
        (r"(?i)\bchainlink\b", "LINK"),
        (r"\bLINK\b", "LINK"),
        (r"(?i)\bdogecoin\b", "DOGE"),
        (r"\bDOGE\b", "DOGE"),
        (r"(?i)\btoncoin\b", "TON"),
        (r"(?i)\bhedera\b", "HBAR"),
        (r"\bHBAR\b", "HBAR"),
        (r"(?i)\balgorand\b", "ALGO"),
        (r"\bALGO\b", "ALGO"),
        (r"(?i)\bstellar\b", "XLM"),
        (r"\bXLM\b", "XLM"),
        (r"(?i)\baptos\b", "APT"),
        (r"\bAPT\b", "APT"),
        (r"(?i)\bfilecoin\b", "FIL"),
        (r"\bFIL\b", "FIL"),
        (r"(?i)\binjective\b", "INJ"),
        (r"\bINJ\b", "INJ"),
        (r"(?i)\bcelestia\b", "TIA"),
        (r"\bTIA\b", "TIA"),
        (r"(?i)\bnear\b", "NEAR"),
        (r"\bNEAR\b", "NEAR"),
        (r"(?i)\bsui\b", "SUI"),
        (r"\bSUI\b", "SUI"),
        (r"(?i)\btron\b", "TRX"),
        (r"\bTRX\b", "TRX"),
        (r"(?i)\baave\b", "AAVE"),
        (r"\bAAVE\b", "AAVE"),
    ]
    .iter()
    .map(|(p, t)| (Regex::new(p).unwrap(), *t))
    .collect();
}

/// The single coin mentioned anywhere in `text`, as a 100% holding.
///
/// `None` when no coin or more than one distinct coin is mentioned.
pub fn single_coin_from_full_text(text: &str) -> Option<ConstituentWeight> {
    let found: HashSet<&str> = COIN_MENTIONS
        .iter()
        .filter(|(pattern, _)| pattern.is_match(text))
        .map(|(_, ticker)| *ticker)
        .collect();

    if found.len() == 1 {
        found.into_iter().next().map(ConstituentWeight::whole)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_coin_by_name_and_ticker() {
        let text = "This ETP tracks Solana. Underlying: SOL. Fees 0.95%";
        assert_eq!(
            single_coin_from_full_text(text),
            Some(ConstituentWeight::whole("SOL"))
        );
    }

    #[test]
    fn test_multiple_coins_give_up() {
        assert_eq!(single_coin_from_full_text("Bitcoin and Ethereum basket"), None);
    }

    #[test]
    fn test_tickers_are_case_sensitive() {
        // lowercase "eth" inside prose is not a mention
        assert_eq!(single_coin_from_full_text("eth zurich lecture notes"), None);
    }

    #[test]
    fn test_no_coin() {
        assert_eq!(single_coin_from_full_text("Gold 100%"), None);
    }
}

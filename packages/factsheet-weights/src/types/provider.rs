//! Issuer tags selecting which heuristic set applies.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

lazy_static! {
    static ref HOST_21SHARES: Regex = Regex::new(r"(?i)21shares\.com").unwrap();
    static ref HOST_VANECK: Regex = Regex::new(r"(?i)vaneck\.com").unwrap();
    static ref HOST_BITWISE: Regex =
        Regex::new(r"(?i)bitwiseinvestments\.eu|etc-group\.com").unwrap();
    static ref HOST_DDA: Regex = Regex::new(r"(?i)deutschedigitalassets\.com").unwrap();
    static ref HOST_COINSHARES: Regex =
        Regex::new(r"(?i)coinshares\.com|kid\.ttmzero\.com").unwrap();
    static ref HOST_WISDOMTREE: Regex =
        Regex::new(r"(?i)wisdomtree\.(com|eu)|dataspanapi\.wisdomtree").unwrap();
}

/// Closed set of issuer families (plus the aggregator and a catch-all).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Provider {
    #[serde(rename = "21shares")]
    TwentyOneShares,
    #[serde(rename = "vaneck")]
    VanEck,
    /// Bitwise, formerly ETC Group
    #[serde(rename = "bitwise")]
    Bitwise,
    /// Deutsche Digital Assets
    #[serde(rename = "dda")]
    Dda,
    #[serde(rename = "coinshares")]
    CoinShares,
    #[serde(rename = "wisdomtree")]
    WisdomTree,
    /// JustETF profile pages
    #[serde(rename = "justetf")]
    JustEtf,
    #[default]
    #[serde(rename = "unknown", other)]
    Unknown,
}

impl Provider {
    /// All variants, in declaration order.
    pub const ALL: [Provider; 8] = [
        Provider::TwentyOneShares,
        Provider::VanEck,
        Provider::Bitwise,
        Provider::Dda,
        Provider::CoinShares,
        Provider::WisdomTree,
        Provider::JustEtf,
        Provider::Unknown,
    ];

    /// Stable lowercase tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::TwentyOneShares => "21shares",
            Provider::VanEck => "vaneck",
            Provider::Bitwise => "bitwise",
            Provider::Dda => "dda",
            Provider::CoinShares => "coinshares",
            Provider::WisdomTree => "wisdomtree",
            Provider::JustEtf => "justetf",
            Provider::Unknown => "unknown",
        }
    }

    /// Infer the issuer from a document address by its host.
    pub fn from_url(url: &str) -> Self {
        if HOST_21SHARES.is_match(url) {
            Provider::TwentyOneShares
        } else if HOST_VANECK.is_match(url) {
            Provider::VanEck
        } else if HOST_BITWISE.is_match(url) {
            Provider::Bitwise
        } else if HOST_DDA.is_match(url) {
            Provider::Dda
        } else if HOST_COINSHARES.is_match(url) {
            Provider::CoinShares
        } else if HOST_WISDOMTREE.is_match(url) {
            Provider::WisdomTree
        } else {
            Provider::Unknown
        }
    }

    /// Whether the vendor holdings escalation applies to this provider.
    pub fn uses_vendor_holdings(&self) -> bool {
        matches!(self, Provider::TwentyOneShares | Provider::Unknown)
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = std::convert::Infallible;

    /// Unrecognised tags map to [`Provider::Unknown`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_ascii_lowercase();
        Ok(Provider::ALL
            .into_iter()
            .find(|p| p.as_str() == tag)
            .unwrap_or(Provider::Unknown))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_url() {
        assert_eq!(
            Provider::from_url("https://cdn.21shares.com/Factsheet_HODL.pdf"),
            Provider::TwentyOneShares
        );
        assert_eq!(
            Provider::from_url("https://www.vaneck.com/kid.pdf"),
            Provider::VanEck
        );
        assert_eq!(
            Provider::from_url("https://etc-group.com/resources/fact_sheet/x.pdf"),
            Provider::Bitwise
        );
        assert_eq!(
            Provider::from_url("https://kid.ttmzero.com/coinshares/X_latest_en_PL.pdf"),
            Provider::CoinShares
        );
        assert_eq!(
            Provider::from_url("https://dataspanapi.wisdomtree.com/x.pdf"),
            Provider::WisdomTree
        );
        assert_eq!(
            Provider::from_url("https://ficas.com/x.pdf"),
            Provider::Unknown
        );
    }

    #[test]
    fn test_serde_tags() {
        let json = serde_json::to_string(&Provider::TwentyOneShares).unwrap();
        assert_eq!(json, "\"21shares\"");

        let parsed: Provider = serde_json::from_str("\"dda\"").unwrap();
        assert_eq!(parsed, Provider::Dda);

        let other: Provider = serde_json::from_str("\"virtune\"").unwrap();
        assert_eq!(other, Provider::Unknown);
    }

    #[test]
    fn test_from_str_roundtrip() {
        for p in Provider::ALL {
            assert_eq!(p.as_str().parse::<Provider>().unwrap(), p);
        }
        assert_eq!("VanEck".parse::<Provider>().unwrap(), Provider::VanEck);
    }
}

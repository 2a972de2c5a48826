//! Outbound URL allow-list for SSRF protection.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{SecurityError, SecurityResult};

lazy_static! {
    /// Issuer, aggregator and vendor hosts the pipeline may talk to.
    /// Anchored at the scheme so an allowed host appearing later in the
    /// URL (query string, path) never matches.
    static ref DEFAULT_PATTERNS: Vec<Regex> = [
        // 21Shares (site, CDN) and its holdings backend
        r"^https://([a-z0-9-]+\.)*21shares\.com(/|$)",
        r"^https://xvmd-hnpa-7dsw\.n7c\.xano\.io/api:",
        // VanEck
        r"^https://([a-z0-9-]+\.)*vaneck\.com(/|$)",
        // Bitwise / ETC Group
        r"^https://([a-z0-9-]+\.)*etc-group\.com(/|$)",
        r"^https://([a-z0-9-]+\.)*bitwiseinvestments\.eu(/|$)",
        // Deutsche Digital Assets
        r"^https://([a-z0-9-]+\.)*deutschedigitalassets\.com(/|$)",
        // JustETF discovery
        r"^https://([a-z0-9-]+\.)*justetf\.com(/|$)",
        // CoinShares (factsheets, KIDs)
        r"^https://([a-z0-9-]+\.)*coinshares\.com(/|$)",
        r"^https://kid\.ttmzero\.com(/|$)",
        // WisdomTree
        r"^https://([a-z0-9-]+\.)*wisdomtree\.(com|eu)(/|$)",
        // FiCAS, Virtune, nxtAssets
        r"^https://([a-z0-9-]+\.)*ficas\.com(/|$)",
        r"^https://([a-z0-9-]+\.)*virtune\.(com|se)(/|$)",
        r"^https://([a-z0-9-]+\.)*nxtassets\.(com|de)(/|$)",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect();
}

/// Predicate over the fixed set of permitted source domains.
///
/// Only `https` targets on an allowed host pass. Matching runs on the
/// parsed, normalized form of the URL, so case and escaping tricks in
/// the raw string cannot smuggle in a different host.
#[derive(Debug, Clone)]
pub struct AllowList {
    patterns: Vec<Regex>,
}

impl Default for AllowList {
    fn default() -> Self {
        Self::new()
    }
}

impl AllowList {
    /// Create an allow-list with the default issuer domains.
    pub fn new() -> Self {
        Self {
            patterns: DEFAULT_PATTERNS.clone(),
        }
    }

    /// Create an allow-list that permits nothing.
    pub fn empty() -> Self {
        Self {
            patterns: Vec::new(),
        }
    }

    /// Permit an additional pattern (matched against the normalized URL).
    pub fn allow_pattern(mut self, pattern: Regex) -> Self {
        self.patterns.push(pattern);
        self
    }

    /// Whether `url` may be fetched.
    pub fn is_allowed(&self, url: &str) -> bool {
        let Ok(parsed) = url::Url::parse(url) else {
            return false;
        };
        if parsed.scheme() != "https" {
            return false;
        }
        let normalized = parsed.as_str();
        self.patterns.iter().any(|p| p.is_match(normalized))
    }

    /// Fail with [`SecurityError::UrlNotAllowed`] unless `url` may be fetched.
    pub fn assert_allowed(&self, url: &str) -> SecurityResult<()> {
        if self.is_allowed(url) {
            Ok(())
        } else {
            Err(SecurityError::UrlNotAllowed {
                url: url.to_string(),
            })
        }
    }
}

//! Discovery through the justETF profile page.
//!
//! The profile page either links an issuer document, lets us build one
//! from the product title, or names the single asset the product tracks.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use super::FactsheetResolver;
use crate::traits::resolver::ResolvedSource;
use crate::types::constituent::ConstituentWeight;
use crate::types::provider::Provider;

pub const PROFILE_URL: &str = "https://www.justetf.com/en/etf-profile.html";

const DDA_FACTSHEET_PREFIX: &str =
    "https://deutschedigitalassets.com/wp-content/uploads/product_uploads/funds/etps";

lazy_static! {
    static ref TITLE: Regex = Regex::new(r"<title>([^|]+)").unwrap();
    static ref NOT_LISTED_TITLE: Regex = Regex::new(r"(?i)ETF Screener|All ETFs").unwrap();

    static ref ISSUER_PDF_LINK: Regex = Regex::new(
        r#"(?i)href="(https://(?:cdn\.21shares\.com|www\.vaneck\.com|bitwiseinvestments\.eu|etc-group\.com|deutschedigitalassets\.com|coinshares\.com|kid\.ttmzero\.com|wisdomtree\.(?:com|eu)|dataspanapi\.wisdomtree\.com|ficas\.com|virtune\.(?:com|se)|nxtassets\.(?:com|de))[^"]*\.pdf)""#
    )
    .unwrap();

    static ref TAG: Regex = Regex::new(r"<[^>]+>").unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();

    static ref INDEX_FIELD: Regex =
        Regex::new(r"(?i)Index:\s*([A-Za-z]+(?:\s*\([A-Z]+\))?)").unwrap();
    static ref PARENTHESISED_SUFFIX: Regex = Regex::new(r"\s*\([a-z]+\)$").unwrap();
    static ref TRACKS_CRYPTOCURRENCY: Regex = Regex::new(
        r"(?i)cryptocurrency\s+(Ethereum|Bitcoin|XRP|Ripple|Solana|Cardano|Polkadot|Litecoin)"
    )
    .unwrap();
    static ref INVESTMENT_FOCUS: Regex = Regex::new(
        r"(?is)Investment focus.{0,300}?>(Ethereum|Bitcoin|XRP|Ripple|Solana|Cardano|Polkadot|Litecoin)<"
    )
    .unwrap();

    static ref VANECK_PREFIX: Regex = Regex::new(r"(?i)VanEck\s+").unwrap();
    static ref ETN_SUFFIX: Regex = Regex::new(r"(?i)\s+ETN.*$").unwrap();
    static ref BITWISE_PREFIX: Regex = Regex::new(r"(?i)^Bitwise\s+").unwrap();
    static ref ETP_SUFFIX: Regex = Regex::new(r"(?i)\s+ETP.*$").unwrap();
    static ref DDA_TITLE: Regex = Regex::new(r"(?i)DDA|Deutsche Digital Assets").unwrap();

    /// DDA products with a known upload slug.
    static ref DDA_SLUGS: Vec<(Regex, &'static str)> = [
        (r"(?i)crypto select 10|slct", "slct-dda-crypto-select-10-etp"),
        (r"(?i)physical bitcoin|xbti", "xbti-dda-physical-bitcoin-etp"),
        (r"(?i)physical ethereum|ieth", "ieth-dda-physical-ethereum-etp"),
    ]
    .iter()
    .map(|(p, slug)| (Regex::new(p).unwrap(), *slug))
    .collect();
}

/// Coin names in the order a product title is checked for them.
const TITLE_COINS: &[&str] = &[
    "ethereum", "bitcoin", "xrp", "ripple", "solana", "cardano", "polkadot", "litecoin",
    "avalanche", "polygon", "chainlink", "uniswap",
];

/// Lowercase index or asset name on the profile page to its ticker.
fn index_ticker(name: &str) -> Option<&'static str> {
    match name {
        "bitcoin" => Some("BTC"),
        "ethereum" => Some("ETH"),
        "ripple (xrp)" | "xrp" | "ripple" => Some("XRP"),
        "solana" => Some("SOL"),
        "cardano" => Some("ADA"),
        "polkadot" | "dot" => Some("DOT"),
        "litecoin" => Some("LTC"),
        "avalanche" => Some("AVAX"),
        "polygon" => Some("MATIC"),
        "chainlink" => Some("LINK"),
        "uniswap" => Some("UNI"),
        "internet computer" => Some("ICP"),
        "aptos" => Some("APT"),
        "sui" => Some("SUI"),
        "near" => Some("NEAR"),
        _ => None,
    }
}

/// Profile page address for an identifier.
pub fn profile_url(isin: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(isin.as_bytes()).collect();
    format!("{}?isin={}", PROFILE_URL, encoded)
}

/// Product title, or `None` when the aggregator does not list the product
/// and served its screener page instead.
pub fn product_title(html: &str) -> Option<String> {
    let title = TITLE.captures(html)?.get(1)?.as_str().trim();
    if title.is_empty() || NOT_LISTED_TITLE.is_match(title) {
        return None;
    }
    Some(title.to_string())
}

/// Issuer PDF links on the page, in page order, with `&amp;` decoded.
pub fn issuer_pdf_links(html: &str) -> Vec<String> {
    ISSUER_PDF_LINK
        .captures_iter(html)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().replace("&amp;", "&"))
        .collect()
}

/// Document addresses built from the product title, in probe order.
pub fn template_candidates(title: &str, isin: &str) -> Vec<(String, Provider)> {
    let lower = title.to_lowercase();
    let mut candidates = Vec::new();

    if lower.contains("vaneck") && lower.contains("etn") {
        let stripped = VANECK_PREFIX.replace(title, "");
        let middle = ETN_SUFFIX.replace(&stripped, "");
        let slug = WHITESPACE.replace_all(middle.trim(), "-");
        candidates.push((
            format!(
                "https://www.vaneck.com/globalassets/home/ucits/documents/kids/KID_VanEck-{}-ETN_en-CH.pdf",
                slug
            ),
            Provider::VanEck,
        ));
    }

    if lower.contains("bitwise") && lower.contains("etp") {
        let stripped = BITWISE_PREFIX.replace(title, "");
        let middle = ETP_SUFFIX.replace(&stripped, "");
        let slug = WHITESPACE.replace_all(&middle.trim().to_lowercase(), "-").into_owned();
        for host in ["bitwiseinvestments.eu", "etc-group.com"] {
            candidates.push((
                format!(
                    "https://{}/resources/fact_sheet/fact-sheet-bitwise-{}-etp.pdf",
                    host, slug
                ),
                Provider::Bitwise,
            ));
        }
    }

    if lower.contains("coinshares") {
        candidates.push((
            format!("https://kid.ttmzero.com/coinshares/{}_latest_en_PL.pdf", isin),
            Provider::CoinShares,
        ));
    }

    if DDA_TITLE.is_match(title) {
        for (pattern, slug) in DDA_SLUGS.iter() {
            if pattern.is_match(title) {
                candidates.push((
                    format!(
                        "{}/{slug}/Germany/Featured/{slug}_Factsheet-de.pdf",
                        DDA_FACTSHEET_PREFIX,
                        slug = slug
                    ),
                    Provider::Dda,
                ));
            }
        }
    }

    candidates
}

fn whole(ticker: &str) -> Vec<ConstituentWeight> {
    vec![ConstituentWeight::whole(ticker)]
}

/// The single asset named on the profile page: the index field, "tracks
/// the cryptocurrency X" prose, the investment-focus cell, or exactly one
/// coin in the title.
pub fn single_asset_from_page(html: &str, title: &str) -> Option<Vec<ConstituentWeight>> {
    let stripped = TAG.replace_all(html, " ");
    let text = WHITESPACE.replace_all(&stripped, " ");

    if let Some(m) = INDEX_FIELD.captures(&text).and_then(|c| c.get(1)) {
        let raw = m.as_str().trim().to_lowercase();
        let normalized = PARENTHESISED_SUFFIX.replace(&raw, "");
        if let Some(ticker) = index_ticker(&raw).or_else(|| index_ticker(normalized.trim())) {
            return Some(whole(ticker));
        }
    }

    let named = TRACKS_CRYPTOCURRENCY
        .captures(&text)
        .or_else(|| INVESTMENT_FOCUS.captures(html))
        .and_then(|c| c.get(1))
        .and_then(|m| index_ticker(&m.as_str().to_lowercase()));
    if let Some(ticker) = named {
        return Some(whole(ticker));
    }

    let title = title.to_lowercase();
    let mut coins = TITLE_COINS.iter().filter(|coin| title.contains(*coin));
    match (coins.next(), coins.next()) {
        (Some(coin), None) => index_ticker(coin).map(whole),
        _ => None,
    }
}

impl FactsheetResolver {
    pub(super) async fn discover_from_aggregator(&self, isin: &str) -> Option<ResolvedSource> {
        let page_url = profile_url(isin);
        let html = self.fetch_page(&page_url).await?;
        let title = match product_title(&html) {
            Some(title) => title,
            None => {
                debug!(isin = %isin, "Not listed by the aggregator");
                return None;
            }
        };

        for url in issuer_pdf_links(&html) {
            if self.probe(&url).await {
                let provider = Provider::from_url(&url);
                return Some(ResolvedSource::Document { url, provider });
            }
        }

        for (url, provider) in template_candidates(&title, isin) {
            if self.probe(&url).await {
                return Some(ResolvedSource::Document { url, provider });
            }
        }

        let constituents = single_asset_from_page(&html, &title)?;
        Some(ResolvedSource::Constituents {
            constituents,
            source_url: page_url,
        })
    }
}

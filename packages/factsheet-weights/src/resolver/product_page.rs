//! Product-page scraping, one link pattern list per issuer family.

use lazy_static::lazy_static;
use regex::Regex;

use super::FactsheetResolver;
use crate::types::provider::Provider;

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns.iter().map(|p| Regex::new(p).unwrap()).collect()
}

lazy_static! {
    static ref TWENTY_ONE_SHARES_LINKS: Vec<Regex> = compile(&[
        r#"(?i)href="(https://cdn\.21shares\.com[^"]*Factsheet[^"]*\.pdf)""#,
    ]);

    static ref VANECK_LINKS: Vec<Regex> = compile(&[
        r#"(?i)href="(https://[a-z0-9.-]*vaneck\.com[^"]*(?:factsheet|fact[-_]sheet)[^"]*\.pdf)""#,
        r#"(?i)href="(https://[a-z0-9.-]*vaneck\.com[^"]*\.pdf)""#,
    ]);

    static ref BITWISE_LINKS: Vec<Regex> = compile(&[
        r#"(?i)href="(https://[a-z0-9.-]*etc-group\.com[^"]*(?:fact[_-]sheet|factsheet)[^"]*\.pdf)""#,
        r#"(?i)href="(https://[a-z0-9.-]*bitwiseinvestments\.eu[^"]*\.pdf)""#,
    ]);

    /// English factsheet first, then any language.
    static ref DDA_LINKS: Vec<Regex> = compile(&[
        r#"(?i)href="(https://[a-z0-9.-]*deutschedigitalassets\.com[^"]*Factsheet-en\.pdf)""#,
        r#"(?i)href="(https://[a-z0-9.-]*deutschedigitalassets\.com[^"]*Factsheet[^"]*\.pdf)""#,
    ]);
}

/// Link patterns for a product page; issuers without their own list use
/// the 21Shares one.
pub fn link_patterns(provider: Provider) -> &'static [Regex] {
    match provider {
        Provider::VanEck => &VANECK_LINKS[..],
        Provider::Bitwise => &BITWISE_LINKS[..],
        Provider::Dda => &DDA_LINKS[..],
        _ => &TWENTY_ONE_SHARES_LINKS[..],
    }
}

/// First document link on the page, by pattern priority.
pub fn find_document_link(provider: Provider, html: &str) -> Option<String> {
    link_patterns(provider).iter().find_map(|pattern| {
        pattern
            .captures(html)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
    })
}

impl FactsheetResolver {
    pub(super) async fn discover_from_product_page(
        &self,
        provider: Provider,
        page_url: &str,
    ) -> Option<String> {
        let html = self.fetch_page(page_url).await?;
        find_document_link(provider, &html).filter(|url| self.permitted(url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vaneck_prefers_factsheet_named_pdf() {
        let html = r#"
            <a href="https://www.vaneck.com/docs/prospectus.pdf">Prospectus</a>
            <a href="https://www.vaneck.com/docs/VanEck-Fact-Sheet-VBTC.pdf">Fact sheet</a>
        "#;
        assert_eq!(
            find_document_link(Provider::VanEck, html).as_deref(),
            Some("https://www.vaneck.com/docs/VanEck-Fact-Sheet-VBTC.pdf")
        );
    }

    #[test]
    fn test_vaneck_falls_back_to_any_pdf() {
        let html = r#"<a href="https://www.vaneck.com/docs/prospectus.pdf">"#;
        assert_eq!(
            find_document_link(Provider::VanEck, html).as_deref(),
            Some("https://www.vaneck.com/docs/prospectus.pdf")
        );
    }

    #[test]
    fn test_dda_prefers_english() {
        let html = r#"
            <a href="https://deutschedigitalassets.com/x/slct_Factsheet-de.pdf">DE</a>
            <a href="https://deutschedigitalassets.com/x/slct_Factsheet-en.pdf">EN</a>
        "#;
        assert_eq!(
            find_document_link(Provider::Dda, html).as_deref(),
            Some("https://deutschedigitalassets.com/x/slct_Factsheet-en.pdf")
        );
    }

    #[test]
    fn test_bitwise_etc_group_then_bitwise_host() {
        let html = r#"<a href="https://bitwiseinvestments.eu/resources/kid.pdf">"#;
        assert_eq!(
            find_document_link(Provider::Bitwise, html).as_deref(),
            Some("https://bitwiseinvestments.eu/resources/kid.pdf")
        );
    }

    #[test]
    fn test_unknown_provider_uses_21shares_patterns() {
        let html = r#"<a href="https://cdn.21shares.com/uploads/Factsheet_ABTC.pdf">"#;
        assert!(find_document_link(Provider::Unknown, html).is_some());
        assert!(find_document_link(Provider::Unknown, "<p>no links</p>").is_none());
    }
}

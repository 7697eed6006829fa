//! Link extraction from fetched pages
//!
//! This module returns link candidates exactly as they appear in the page.
//! Resolving them against the page's address is left to [`crate::url::Url::parse`].
//!
//! Two sources are used:
//! - `<a href="...">` anchors, found by parsing the HTML
//! - matches of a link pattern over the raw body, when regex search is on

use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;

static ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("hardcoded selector is valid"));

/// Extracts the `href` of every anchor in the document, in document order
///
/// Empty values are skipped. Duplicates are kept: a page linking twice to
/// the same address reports it twice.
///
/// # Example
///
/// ```
/// use link_crawler::crawler::extract_anchor_links;
///
/// let html = r#"<html><body><a href="/page">Link</a><a href=" other ">x</a></body></html>"#;
/// assert_eq!(extract_anchor_links(html), vec!["/page", "other"]);
/// ```
pub fn extract_anchor_links(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    document
        .select(&ANCHOR_SELECTOR)
        .filter_map(|element| element.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .map(str::to_string)
        .collect()
}

/// Finds link candidates in a page body with a pattern
///
/// Implementations must be stateless with respect to a single page: the
/// same body and pattern always yield the same candidates.
pub trait LinkExtractor: Send + Sync {
    fn extract_links(&self, body: &str, pattern: &Regex) -> Vec<String>;
}

/// Default [`LinkExtractor`]
///
/// For every match, the first capture group that participated is the
/// candidate. Patterns without capture groups yield the whole match.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternExtractor;

impl LinkExtractor for PatternExtractor {
    fn extract_links(&self, body: &str, pattern: &Regex) -> Vec<String> {
        pattern
            .captures_iter(body)
            .filter_map(|captures| {
                captures
                    .iter()
                    .skip(1)
                    .flatten()
                    .next()
                    .or_else(|| captures.get(0))
            })
            .map(|m| m.as_str().trim())
            .filter(|candidate| !candidate.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::url::Url;

    #[test]
    fn test_extract_single_anchor() {
        let html = r#"<html><body><a href="https://other.com/page">Link</a></body></html>"#;
        assert_eq!(extract_anchor_links(html), vec!["https://other.com/page"]);
    }

    #[test]
    fn test_anchor_order_and_duplicates_kept() {
        let html = r#"
            <html>
            <body>
                <a href="/page1">Link 1</a>
                <a href="/page2">Link 2</a>
                <a href="/page1">Link 1 again</a>
            </body>
            </html>
        "#;
        assert_eq!(
            extract_anchor_links(html),
            vec!["/page1", "/page2", "/page1"]
        );
    }

    #[test]
    fn test_anchors_without_href_ignored() {
        let html = r#"<html><body><a name="top">Top</a><a href="">Empty</a><a href="/x">X</a></body></html>"#;
        assert_eq!(extract_anchor_links(html), vec!["/x"]);
    }

    #[test]
    fn test_non_anchor_links_ignored() {
        let html = r#"
            <html>
            <head><link rel="stylesheet" href="/style.css"></head>
            <body><img src="/logo.png"><script src="/app.js"></script></body>
            </html>
        "#;
        assert!(extract_anchor_links(html).is_empty());
    }

    #[test]
    fn test_malformed_html_tolerated() {
        let html = r#"<html><body><a href="/ok">unclosed <div><a href='/also-ok'>"#;
        assert_eq!(extract_anchor_links(html), vec!["/ok", "/also-ok"]);
    }

    #[test]
    fn test_pattern_extractor_default_regex() {
        let body = r#"
            <a href="/docs">Docs</a>
            <img src='/img/logo.png'>
            Visit https://other.com/page for more
        "#;
        let links = PatternExtractor.extract_links(body, Url::default_regex());
        assert_eq!(
            links,
            vec!["/docs", "/img/logo.png", "https://other.com/page"]
        );
    }

    #[test]
    fn test_pattern_extractor_whole_match() {
        let pattern = Regex::new(r"/item/\d+").unwrap();
        let links = PatternExtractor.extract_links("see /item/1 and /item/22", &pattern);
        assert_eq!(links, vec!["/item/1", "/item/22"]);
    }

    #[test]
    fn test_pattern_extractor_skips_empty_captures() {
        let links = PatternExtractor.extract_links(r#"<a href="">x</a>"#, Url::default_regex());
        assert!(links.is_empty());
    }
}

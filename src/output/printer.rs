//! Console reporting of crawl results
//!
//! Pages are reported as one line each:
//!
//! ```text
//! The urls present in https://a.test/ are: https://a.test/x (2), https://a.test/y (1)
//! ```

use crate::crawler::{CrawlReport, FailureRecord, PageRecord};
use crate::url::Url;

/// Something that happened to a single URL during the crawl
#[derive(Debug, Clone, Copy)]
pub enum CrawlEvent<'a> {
    /// A new URL was admitted to the frontier
    Discovered { url: &'a Url, depth: u32 },

    /// A page was fetched and its links extracted
    Fetched { page: &'a PageRecord },

    /// A page could not be fetched
    Failed { failure: &'a FailureRecord },
}

/// Receives crawl events as they happen
///
/// Called concurrently from every worker.
pub trait CrawlPrinter: Send + Sync {
    fn emit(&self, event: &CrawlEvent<'_>);
}

/// Prints fetched and failed pages to stdout
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsolePrinter;

impl CrawlPrinter for ConsolePrinter {
    fn emit(&self, event: &CrawlEvent<'_>) {
        match event {
            CrawlEvent::Fetched { page } => {
                println!("{}", format_page_line(&page.url.get_basic_url(), &page.links));
            }
            CrawlEvent::Failed { failure } => {
                println!("{}", format_page_line(&failure.url.get_basic_url(), &[]));
            }
            CrawlEvent::Discovered { .. } => {}
        }
    }
}

/// Formats the line reported for one page
///
/// Links are listed once each, in order of first appearance, with the
/// number of times the page links to them.
pub fn format_page_line(page: &str, links: &[String]) -> String {
    let mut counted: Vec<(&str, usize)> = Vec::new();
    for link in links {
        match counted.iter_mut().find(|(seen, _)| *seen == link.as_str()) {
            Some((_, count)) => *count += 1,
            None => counted.push((link.as_str(), 1)),
        }
    }

    let listed = counted
        .iter()
        .map(|(link, count)| format!("{} ({})", link, count))
        .collect::<Vec<_>>()
        .join(", ");

    format!("The urls present in {} are: {}", page, listed)
}

/// Formats every crawled page of a report, one line per page
pub fn format_crawling_results(report: &CrawlReport) -> String {
    report
        .crawled_urls()
        .into_iter()
        .map(|(page, links)| format_page_line(page, links))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Prints every crawled page of a report
pub fn print_crawling_results(report: &CrawlReport) {
    let results = format_crawling_results(report);
    if !results.is_empty() {
        println!("{}", results);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn links(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_format_page_line_counts_duplicates() {
        let line = format_page_line(
            "https://a.test/",
            &links(&["https://a.test/x", "https://a.test/y", "https://a.test/x"]),
        );
        assert_eq!(
            line,
            "The urls present in https://a.test/ are: https://a.test/x (2), https://a.test/y (1)"
        );
    }

    #[test]
    fn test_format_page_line_without_links() {
        assert_eq!(
            format_page_line("https://a.test/empty", &[]),
            "The urls present in https://a.test/empty are: "
        );
    }
}

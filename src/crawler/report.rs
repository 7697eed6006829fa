//! Crawl outcome records
//!
//! Every URL the crawler considered ends up in exactly one of three maps,
//! keyed by its canonical address: succeeded, failed or discarded.

use crate::url::{Url, UrlSet};
use crate::TransportError;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;

/// Why a URL was never fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DiscardReason {
    /// Deeper than `max_depth`
    DepthExceeded,

    /// On another domain while domain filtering is on
    OutOfScope,

    /// Not an http(s) address with a valid domain
    Invalid,

    /// Points at a png/pdf/jpg/jpeg/txt document
    ContentUrl,

    /// Still waiting when the crawl was cancelled
    Cancelled,
}

impl DiscardReason {
    pub const ALL: [DiscardReason; 5] = [
        DiscardReason::DepthExceeded,
        DiscardReason::OutOfScope,
        DiscardReason::Invalid,
        DiscardReason::ContentUrl,
        DiscardReason::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DiscardReason::DepthExceeded => "depth_exceeded",
            DiscardReason::OutOfScope => "out_of_scope",
            DiscardReason::Invalid => "invalid",
            DiscardReason::ContentUrl => "content_url",
            DiscardReason::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for DiscardReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A page that was fetched successfully
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRecord {
    pub url: Url,
    pub depth: u32,

    /// HTTP status of the successful attempt
    pub status: u16,

    /// Attempts made, the successful one included
    pub attempts: u32,

    /// Canonical addresses of the links found on the page, in page order
    /// (duplicates kept, self-links removed)
    pub links: Vec<String>,
}

/// A page whose fetch failed permanently
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureRecord {
    pub url: Url,
    pub depth: u32,
    pub attempts: u32,

    /// The error of the last attempt
    pub error: TransportError,
}

/// A URL that was never fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscardRecord {
    pub url: Url,
    pub depth: u32,
    pub reason: DiscardReason,
}

/// Accumulates outcomes while the crawl is running
#[derive(Debug, Default)]
pub(crate) struct CrawlResults {
    pub(crate) succeeded: BTreeMap<String, PageRecord>,
    pub(crate) failed: BTreeMap<String, FailureRecord>,
    pub(crate) discarded: BTreeMap<String, DiscardRecord>,
    pub(crate) invalid_links: usize,
}

impl CrawlResults {
    pub(crate) fn record_success(&mut self, record: PageRecord) {
        self.succeeded.insert(record.url.get_basic_url(), record);
    }

    pub(crate) fn record_failure(&mut self, record: FailureRecord) {
        self.failed.insert(record.url.get_basic_url(), record);
    }

    /// Records a discard, replacing an earlier one for the same address
    pub(crate) fn record_discard(&mut self, url: Url, depth: u32, reason: DiscardReason) {
        self.discarded
            .insert(url.get_basic_url(), DiscardRecord { url, depth, reason });
    }

    /// Records a discard unless the address already has one
    pub(crate) fn record_discard_once(&mut self, url: Url, depth: u32, reason: DiscardReason) {
        self.discarded
            .entry(url.get_basic_url())
            .or_insert(DiscardRecord { url, depth, reason });
    }
}

/// Everything known about a finished crawl
#[derive(Debug)]
pub struct CrawlReport {
    /// The normalized seed
    pub seed: Url,

    pub succeeded: BTreeMap<String, PageRecord>,
    pub failed: BTreeMap<String, FailureRecord>,
    pub discarded: BTreeMap<String, DiscardRecord>,

    /// Every URL that was admitted to the frontier
    pub visited: UrlSet,

    /// Link candidates that could not be turned into a valid URL
    pub invalid_links: usize,

    /// Transport attempts made over the whole crawl
    pub requests_made: usize,

    /// Whether the crawl was stopped before the frontier ran dry
    pub cancelled: bool,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl CrawlReport {
    pub(crate) fn new(
        seed: Url,
        results: CrawlResults,
        visited: UrlSet,
        requests_made: usize,
        cancelled: bool,
        started_at: DateTime<Utc>,
    ) -> Self {
        let CrawlResults {
            succeeded,
            failed,
            mut discarded,
            invalid_links,
        } = results;

        // A URL seen too deep on one path may still be reached on a shorter one
        discarded.retain(|key, _| !succeeded.contains_key(key) && !failed.contains_key(key));

        Self {
            seed,
            succeeded,
            failed,
            discarded,
            visited,
            invalid_links,
            requests_made,
            cancelled,
            started_at,
            finished_at: Utc::now(),
        }
    }

    /// Wall-clock duration of the crawl
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }

    /// Links found on every crawled page, failed pages mapping to no links
    pub fn crawled_urls(&self) -> BTreeMap<&str, &[String]> {
        let mut urls: BTreeMap<&str, &[String]> = self
            .succeeded
            .iter()
            .map(|(key, page)| (key.as_str(), page.links.as_slice()))
            .collect();
        for key in self.failed.keys() {
            urls.insert(key.as_str(), &[]);
        }
        urls
    }

    /// Number of URLs discarded for `reason`
    pub fn discarded_count(&self, reason: DiscardReason) -> usize {
        self.discarded
            .values()
            .filter(|record| record.reason == reason)
            .count()
    }

    /// Total number of links reported across all crawled pages
    pub fn total_links(&self) -> usize {
        self.succeeded.values().map(|page| page.links.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(raw: &str) -> Url {
        Url::new(raw).unwrap()
    }

    fn page(raw: &str, links: &[&str]) -> PageRecord {
        PageRecord {
            url: url(raw),
            depth: 0,
            status: 200,
            attempts: 1,
            links: links.iter().map(|l| l.to_string()).collect(),
        }
    }

    #[test]
    fn test_discard_reason_strings() {
        assert_eq!(DiscardReason::DepthExceeded.to_string(), "depth_exceeded");
        assert_eq!(DiscardReason::OutOfScope.as_str(), "out_of_scope");
        assert_eq!(DiscardReason::ALL.len(), 5);
    }

    #[test]
    fn test_record_discard_once_keeps_first() {
        let mut results = CrawlResults::default();
        results.record_discard_once(url("https://a.test/x"), 3, DiscardReason::DepthExceeded);
        results.record_discard_once(url("https://a.test/x"), 4, DiscardReason::DepthExceeded);
        assert_eq!(results.discarded["https://a.test/x"].depth, 3);

        results.record_discard(url("https://a.test/x"), 2, DiscardReason::ContentUrl);
        assert_eq!(
            results.discarded["https://a.test/x"].reason,
            DiscardReason::ContentUrl
        );
    }

    #[test]
    fn test_report_drops_discards_that_were_crawled() {
        let mut results = CrawlResults::default();
        results.record_success(page("https://a.test/", &["https://a.test/x"]));
        results.record_success(page("https://a.test/x", &[]));
        results.record_discard_once(url("https://a.test/x"), 2, DiscardReason::DepthExceeded);
        results.record_discard_once(url("https://a.test/y"), 2, DiscardReason::DepthExceeded);

        let report = CrawlReport::new(
            url("https://a.test/"),
            results,
            UrlSet::new(),
            2,
            false,
            Utc::now(),
        );

        assert_eq!(report.succeeded.len(), 2);
        assert_eq!(report.discarded.len(), 1);
        assert!(report.discarded.contains_key("https://a.test/y"));
        assert_eq!(report.discarded_count(DiscardReason::DepthExceeded), 1);
        assert_eq!(report.total_links(), 1);
    }

    #[test]
    fn test_crawled_urls_includes_failures() {
        let mut results = CrawlResults::default();
        results.record_success(page("https://a.test/", &["https://a.test/gone"]));
        results.record_failure(FailureRecord {
            url: url("https://a.test/gone"),
            depth: 1,
            attempts: 1,
            error: TransportError::Status {
                url: "https://a.test/gone".to_string(),
                status: 404,
            },
        });

        let report = CrawlReport::new(
            url("https://a.test/"),
            results,
            UrlSet::new(),
            2,
            false,
            Utc::now(),
        );

        let crawled = report.crawled_urls();
        assert_eq!(crawled.len(), 2);
        assert_eq!(crawled["https://a.test/"], ["https://a.test/gone".to_string()]);
        assert!(crawled["https://a.test/gone"].is_empty());
        assert!(report.duration() >= chrono::Duration::zero());
    }
}

use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

/// Main configuration structure for Link-Crawler
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,

    /// Headers sent with every request
    #[serde(default = "default_headers")]
    pub headers: HashMap<String, String>,
}

impl Config {
    /// Creates a configuration for `url` with every other setting at its default
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            crawler: CrawlerConfig::new(url),
            headers: default_headers(),
        }
    }
}

/// Crawler behavior configuration
///
/// Delays are expressed in milliseconds in the file and exposed as
/// [`Duration`]s through accessor methods.
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// The seed URL the crawl starts from
    pub url: String,

    /// Maximum link depth from the seed (absent = unlimited, 0 = seed only)
    #[serde(rename = "max-depth", default)]
    pub max_depth: Option<u32>,

    /// Number of concurrent workers
    #[serde(rename = "max-runners", default = "default_max_runners")]
    pub max_runners: usize,

    /// Optional cap on simultaneously in-flight requests
    #[serde(rename = "concurrent-requests-limit", default)]
    pub concurrent_requests_limit: Option<usize>,

    /// Retries after a failed request (total attempts = retries + 1)
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay before retrying a failed request (milliseconds)
    #[serde(
        rename = "sleep-between-retries",
        default = "default_sleep_between_retries"
    )]
    pub sleep_between_retries_ms: u64,

    /// Pacing delay after every request (milliseconds)
    #[serde(rename = "sleep-after-request", default)]
    pub sleep_after_request_ms: u64,

    /// Per-request timeout (milliseconds)
    #[serde(rename = "request-timeout", default = "default_request_timeout")]
    pub request_timeout_ms: u64,

    /// Optional deadline for the whole crawl (milliseconds)
    #[serde(rename = "max-duration", default)]
    pub max_duration_ms: Option<u64>,

    /// Also extract links by pattern matching over the whole page
    #[serde(rename = "regex-search", default)]
    pub regex_search: bool,

    /// Custom link pattern used by regex search
    #[serde(rename = "link-pattern", default)]
    pub link_pattern: Option<String>,

    /// Restrict the crawl to the seed's domain
    #[serde(rename = "domain-filter", default = "default_true")]
    pub domain_filter: bool,

    /// Same-domain http(s) links inherit the parent page's protocol
    #[serde(rename = "assume-parent-protocol", default = "default_true")]
    pub assume_parent_protocol: bool,

    /// Report every crawled page as soon as it is processed
    #[serde(rename = "print-in-real-time", default)]
    pub print_in_real_time: bool,

    /// Never fetch png/pdf/jpg/jpeg/txt documents
    #[serde(rename = "skip-content-urls", default = "default_true")]
    pub skip_content_urls: bool,
}

impl CrawlerConfig {
    /// Creates a crawler configuration for `url` with default settings
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_depth: None,
            max_runners: default_max_runners(),
            concurrent_requests_limit: None,
            max_retries: default_max_retries(),
            sleep_between_retries_ms: default_sleep_between_retries(),
            sleep_after_request_ms: 0,
            request_timeout_ms: default_request_timeout(),
            max_duration_ms: None,
            regex_search: false,
            link_pattern: None,
            domain_filter: true,
            assume_parent_protocol: true,
            print_in_real_time: false,
            skip_content_urls: true,
        }
    }

    pub fn sleep_between_retries(&self) -> Duration {
        Duration::from_millis(self.sleep_between_retries_ms)
    }

    pub fn sleep_after_request(&self) -> Duration {
        Duration::from_millis(self.sleep_after_request_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn max_duration(&self) -> Option<Duration> {
        self.max_duration_ms.map(Duration::from_millis)
    }

    /// Maximum number of fetches that may be in flight at the same time
    pub fn in_flight_limit(&self) -> usize {
        match self.concurrent_requests_limit {
            Some(limit) => limit.min(self.max_runners),
            None => self.max_runners,
        }
    }
}

pub(crate) fn default_headers() -> HashMap<String, String> {
    HashMap::from([("User-Agent".to_string(), "Mozilla/5.0".to_string())])
}

fn default_max_runners() -> usize {
    100
}

fn default_max_retries() -> u32 {
    5
}

fn default_sleep_between_retries() -> u64 {
    300
}

fn default_request_timeout() -> u64 {
    30_000
}

fn default_true() -> bool {
    true
}

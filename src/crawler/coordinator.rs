//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that coordinates all aspects of
//! the crawling process, including:
//! - Seeding the frontier and the deduplication set
//! - Running the worker pool and the in-flight admission gate
//! - Coordinating fetching, link extraction and scheduling of children
//! - Handling cancellation and the crawl deadline
//! - Assembling the final report

use crate::config::{validate, Config};
use crate::crawler::frontier::{Frontier, FrontierEntry};
use crate::crawler::parser::{extract_anchor_links, LinkExtractor, PatternExtractor};
use crate::crawler::report::{
    CrawlReport, CrawlResults, DiscardReason, FailureRecord, PageRecord,
};
use crate::crawler::retry::{RetryOutcome, RetryPolicy};
use crate::crawler::transport::{FetchResponse, HttpTransport, Transport};
use crate::output::{ConsolePrinter, CrawlEvent, CrawlPrinter};
use crate::url::{Url, UrlSet};
use crate::{ConfigError, CrawlError, TransportError};
use chrono::Utc;
use regex::Regex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Pages between two progress log lines
const PROGRESS_INTERVAL: usize = 10;

/// Bounded-concurrency crawler
///
/// A `Crawler` is built once from a validated [`Config`] and can run any
/// number of independent crawls; each crawl gets a fresh frontier and
/// deduplication set.
///
/// # Example
///
/// ```no_run
/// use link_crawler::{Config, Crawler};
///
/// # async fn run() -> Result<(), link_crawler::CrawlError> {
/// let mut config = Config::new("https://example.com");
/// config.crawler.max_depth = Some(2);
///
/// let report = Crawler::new(config)?.crawl().await?;
/// println!("{} pages crawled", report.succeeded.len());
/// # Ok(())
/// # }
/// ```
pub struct Crawler {
    config: Config,
    seed: Url,
    pattern: Regex,
    transport: Arc<dyn Transport>,
    extractor: Arc<dyn LinkExtractor>,
    printer: Arc<dyn CrawlPrinter>,
}

impl Crawler {
    /// Creates a crawler that fetches pages over HTTP
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - Ready to crawl
    /// * `Err(CrawlError)` - Invalid seed, invalid configuration, or the
    ///   HTTP client could not be built
    pub fn new(config: Config) -> Result<Self, CrawlError> {
        let seed = parse_seed(&config.crawler.url)?;
        let transport = HttpTransport::new(config.crawler.request_timeout())?;
        Self::assemble(config, seed, Arc::new(transport))
    }

    /// Creates a crawler that fetches pages through `transport`
    pub fn with_transport(
        config: Config,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, CrawlError> {
        let seed = parse_seed(&config.crawler.url)?;
        Self::assemble(config, seed, transport)
    }

    fn assemble(
        config: Config,
        seed: Url,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, CrawlError> {
        validate(&config)?;

        let pattern = match &config.crawler.link_pattern {
            Some(pattern) => Regex::new(pattern)
                .map_err(|e| ConfigError::InvalidPattern(format!("'{}': {}", pattern, e)))?,
            None => Url::default_regex().clone(),
        };

        Ok(Self {
            config,
            seed,
            pattern,
            transport,
            extractor: Arc::new(PatternExtractor),
            printer: Arc::new(ConsolePrinter),
        })
    }

    /// Replaces the printer used for real-time reporting
    pub fn with_printer(mut self, printer: Arc<dyn CrawlPrinter>) -> Self {
        self.printer = printer;
        self
    }

    /// Replaces the extractor used for regex search
    pub fn with_extractor(mut self, extractor: Arc<dyn LinkExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The normalized seed URL
    pub fn seed(&self) -> &Url {
        &self.seed
    }

    /// Runs a crawl to completion
    pub async fn crawl(&self) -> Result<CrawlReport, CrawlError> {
        self.crawl_with_cancellation(CancellationToken::new()).await
    }

    /// Runs a crawl that stops early once `cancel` is triggered
    ///
    /// After cancellation no new fetch starts, pending retries are
    /// abandoned, and URLs still waiting in the frontier are reported as
    /// [`DiscardReason::Cancelled`]. The report is returned either way.
    pub async fn crawl_with_cancellation(
        &self,
        cancel: CancellationToken,
    ) -> Result<CrawlReport, CrawlError> {
        let started_at = Utc::now();
        let crawler = &self.config.crawler;

        tracing::info!(
            "Starting crawl of {} ({} runners, {} requests in flight at most, max depth {})",
            self.seed,
            crawler.max_runners,
            crawler.in_flight_limit(),
            crawler
                .max_depth
                .map_or_else(|| "unlimited".to_string(), |d| d.to_string())
        );

        let context = Arc::new(CrawlContext {
            config: self.config.clone(),
            seed: self.seed.clone(),
            pattern: self.pattern.clone(),
            frontier: Frontier::new(),
            visited: UrlSet::new(),
            limiter: Semaphore::new(crawler.in_flight_limit()),
            retry: RetryPolicy::new(crawler.max_retries, crawler.sleep_between_retries()),
            transport: Arc::clone(&self.transport),
            extractor: Arc::clone(&self.extractor),
            printer: crawler.print_in_real_time.then(|| Arc::clone(&self.printer)),
            results: Mutex::new(CrawlResults::default()),
            requests_made: AtomicUsize::new(0),
            pages_processed: AtomicUsize::new(0),
            started: Instant::now(),
            cancel: cancel.clone(),
        });

        context.visited.add(&self.seed);
        context.emit(&CrawlEvent::Discovered {
            url: &self.seed,
            depth: 0,
        });
        context.frontier.push(self.seed.clone(), 0);

        let deadline = crawler.max_duration().map(|limit| {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(limit).await;
                tracing::warn!("Maximum crawl duration of {:?} reached, stopping", limit);
                cancel.cancel();
            })
        });

        let mut workers = JoinSet::new();
        for worker_id in 0..crawler.max_runners {
            let context = Arc::clone(&context);
            workers.spawn(async move { context.run_worker(worker_id).await });
        }

        while let Some(result) = workers.join_next().await {
            if let Err(e) = result {
                tracing::error!("Crawl worker terminated abnormally: {}", e);
            }
        }

        if let Some(deadline) = deadline {
            deadline.abort();
        }

        let cancelled = cancel.is_cancelled();
        if cancelled {
            context.discard_remaining();
        }

        let requests_made = context.requests_made.load(Ordering::SeqCst);
        let (results, visited) = match Arc::try_unwrap(context) {
            Ok(context) => (
                context
                    .results
                    .into_inner()
                    .unwrap_or_else(PoisonError::into_inner),
                context.visited,
            ),
            Err(shared) => (
                std::mem::take(&mut *shared.results()),
                shared.visited.values().into_iter().collect(),
            ),
        };

        let report = CrawlReport::new(
            self.seed.clone(),
            results,
            visited,
            requests_made,
            cancelled,
            started_at,
        );

        tracing::info!(
            "Crawl {}: {} pages crawled, {} failed, {} discarded, {} requests in {:.2}s",
            if cancelled { "cancelled" } else { "complete" },
            report.succeeded.len(),
            report.failed.len(),
            report.discarded.len(),
            report.requests_made,
            report.duration().num_milliseconds() as f64 / 1000.0
        );

        Ok(report)
    }
}

/// Validates the seed the same way every other URL is validated
fn parse_seed(raw: &str) -> Result<Url, CrawlError> {
    let seed = Url::new(raw).map_err(|e| CrawlError::InvalidSeed {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    if !seed.is_valid() {
        return Err(CrawlError::InvalidSeed {
            url: raw.to_string(),
            reason: "not an http(s) URL with a valid domain".to_string(),
        });
    }

    Ok(seed)
}

/// State shared by the workers of one crawl
struct CrawlContext {
    config: Config,
    seed: Url,
    pattern: Regex,
    frontier: Frontier,
    visited: UrlSet,
    limiter: Semaphore,
    retry: RetryPolicy,
    transport: Arc<dyn Transport>,
    extractor: Arc<dyn LinkExtractor>,
    printer: Option<Arc<dyn CrawlPrinter>>,
    results: Mutex<CrawlResults>,
    requests_made: AtomicUsize,
    pages_processed: AtomicUsize,
    started: Instant,
    cancel: CancellationToken,
}

impl CrawlContext {
    async fn run_worker(&self, worker_id: usize) {
        tracing::trace!("Worker {} started", worker_id);

        loop {
            let claimed = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                claimed = self.frontier.pop() => match claimed {
                    Some(claimed) => claimed,
                    None => break,
                },
            };

            self.process(claimed.entry()).await;
            self.report_progress();
        }

        tracing::trace!("Worker {} finished", worker_id);
    }

    /// Handles one frontier entry: filter, fetch, extract and schedule children
    async fn process(&self, entry: &FrontierEntry) {
        let FrontierEntry { url, depth } = entry;
        let depth = *depth;

        if let Some(reason) = self.discard_reason(url, depth) {
            tracing::debug!("Discarding {} ({})", url, reason);
            self.results().record_discard(url.clone(), depth, reason);
            return;
        }

        let outcome = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => RetryOutcome::Cancelled { attempts: 0 },
            outcome = self.fetch(url) => outcome,
        };

        // Whatever arrives after cancellation is not used
        if self.cancel.is_cancelled() {
            self.results()
                .record_discard(url.clone(), depth, DiscardReason::Cancelled);
            return;
        }

        match outcome {
            RetryOutcome::Success {
                value: response,
                attempts,
            } => {
                let links = self.discover_links(url, depth, &response.body);
                tracing::debug!(
                    "Fetched {} (HTTP {}, {} links, {} attempts)",
                    url,
                    response.status,
                    links.len(),
                    attempts
                );

                let page = PageRecord {
                    url: url.clone(),
                    depth,
                    status: response.status,
                    attempts,
                    links,
                };
                self.emit(&CrawlEvent::Fetched { page: &page });
                self.results().record_success(page);
            }
            RetryOutcome::Failed { error, attempts } => {
                tracing::error!("Giving up on {} after {} attempts: {}", url, attempts, error);

                let failure = FailureRecord {
                    url: url.clone(),
                    depth,
                    attempts,
                    error,
                };
                self.emit(&CrawlEvent::Failed { failure: &failure });
                self.results().record_failure(failure);
            }
            RetryOutcome::Cancelled { .. } => {
                self.results()
                    .record_discard(url.clone(), depth, DiscardReason::Cancelled);
            }
        }
    }

    /// Returns why `url` must not be fetched, if anything
    fn discard_reason(&self, url: &Url, depth: u32) -> Option<DiscardReason> {
        let crawler = &self.config.crawler;

        if crawler.max_depth.is_some_and(|max| depth > max) {
            Some(DiscardReason::DepthExceeded)
        } else if !url.is_valid() {
            Some(DiscardReason::Invalid)
        } else if !url.is_crawlable(self.seed.domain(), crawler.domain_filter) {
            Some(DiscardReason::OutOfScope)
        } else if crawler.skip_content_urls && url.is_content() {
            Some(DiscardReason::ContentUrl)
        } else {
            None
        }
    }

    /// Fetches `url` under the retry policy
    async fn fetch(&self, url: &Url) -> RetryOutcome<FetchResponse, TransportError> {
        let request_url = url.get_request_url();
        let request_url = request_url.as_str();

        self.retry
            .execute(&self.cancel, TransportError::is_retryable, |attempt| async move {
                self.fetch_once(request_url, attempt).await
            })
            .await
    }

    /// One transport attempt, gated by the in-flight limit
    async fn fetch_once(&self, url: &str, attempt: u32) -> Result<FetchResponse, TransportError> {
        let result = match self.limiter.acquire().await {
            Ok(_permit) => {
                tracing::debug!("Fetching {} (attempt {})", url, attempt);
                self.requests_made.fetch_add(1, Ordering::SeqCst);
                self.transport.fetch(url, &self.config.headers).await
            }
            Err(_) => Err(TransportError::Request {
                url: url.to_string(),
                message: "request limiter closed".to_string(),
            }),
        };

        let pause = self.config.crawler.sleep_after_request();
        if !pause.is_zero() {
            tokio::time::sleep(pause).await;
        }

        let response = result?;
        if response.status >= 400 {
            return Err(TransportError::Status {
                url: url.to_string(),
                status: response.status,
            });
        }

        Ok(response)
    }

    /// Extracts, resolves and schedules the links of a fetched page
    ///
    /// Returns the canonical addresses of the page's links in page order,
    /// duplicates kept and links back to the page itself removed. With the
    /// domain filter on, links to other domains are left out of the list
    /// but still scheduled, so they end up as out-of-scope discards.
    fn discover_links(&self, page: &Url, depth: u32, body: &str) -> Vec<String> {
        let mut found: Vec<Url> = extract_anchor_links(body)
            .iter()
            .filter_map(|raw| self.resolve(raw, page))
            .collect();

        if self.config.crawler.regex_search {
            let mut seen: HashSet<String> = found.iter().map(Url::get_basic_url).collect();
            for raw in self.extractor.extract_links(body, &self.pattern) {
                if let Some(url) = self.resolve(&raw, page) {
                    if seen.insert(url.get_basic_url()) {
                        found.push(url);
                    }
                }
            }
        }

        let page_key = page.get_basic_url();
        let mut links = Vec::with_capacity(found.len());

        for child in found {
            let key = child.get_basic_url();
            if key == page_key {
                continue;
            }
            if !self.config.crawler.domain_filter || child.domain() == self.seed.domain() {
                links.push(key);
            }
            self.schedule(child, depth + 1);
        }

        links
    }

    /// Resolves one link candidate against the page it was found on
    fn resolve(&self, raw: &str, page: &Url) -> Option<Url> {
        let assume_parent_protocol = self.config.crawler.assume_parent_protocol;

        match Url::parse(raw, Some(page), assume_parent_protocol) {
            Ok(url) if url.is_valid() => Some(url),
            Ok(url) => {
                tracing::debug!("Ignoring invalid link {} on {}", url, page);
                self.results().invalid_links += 1;
                None
            }
            Err(e) => {
                tracing::debug!("Ignoring link on {}: {}", page, e);
                self.results().invalid_links += 1;
                None
            }
        }
    }

    /// Admits a child to the frontier unless it was seen before or is too deep
    fn schedule(&self, child: Url, depth: u32) {
        if self
            .config
            .crawler
            .max_depth
            .is_some_and(|max| depth > max)
        {
            if !self.visited.contains(&child.get_basic_url()) {
                self.results()
                    .record_discard_once(child, depth, DiscardReason::DepthExceeded);
            }
            return;
        }

        if self.visited.add(&child) {
            self.emit(&CrawlEvent::Discovered { url: &child, depth });
            self.frontier.push(child, depth);
        }
    }

    /// Records every entry still queued after cancellation
    fn discard_remaining(&self) {
        let remaining = self.frontier.drain();
        if remaining.is_empty() {
            return;
        }

        tracing::info!("Discarding {} queued URLs after cancellation", remaining.len());
        let mut results = self.results();
        for FrontierEntry { url, depth } in remaining {
            results.record_discard(url, depth, DiscardReason::Cancelled);
        }
    }

    fn report_progress(&self) {
        let processed = self.pages_processed.fetch_add(1, Ordering::SeqCst) + 1;
        if processed % PROGRESS_INTERVAL == 0 {
            let elapsed = self.started.elapsed().as_secs_f64();
            let rate = if elapsed > 0.0 {
                processed as f64 / elapsed
            } else {
                0.0
            };
            tracing::info!(
                "Progress: {} URLs processed, {} in frontier, {:.2} URLs/sec",
                processed,
                self.frontier.len(),
                rate
            );
        }
    }

    fn emit(&self, event: &CrawlEvent<'_>) {
        if let Some(printer) = &self.printer {
            printer.emit(event);
        }
    }

    fn results(&self) -> MutexGuard<'_, CrawlResults> {
        self.results.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

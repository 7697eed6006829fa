//! Output module for reporting crawl results
//!
//! This module handles:
//! - Real-time reporting of pages as they are crawled
//! - Printing the full results at the end of a crawl
//! - Computing and printing crawl statistics
//! - Generating markdown summaries

mod markdown;
mod printer;
pub mod stats;

pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use printer::{
    format_crawling_results, format_page_line, print_crawling_results, ConsolePrinter,
    CrawlEvent, CrawlPrinter,
};
pub use stats::{print_statistics, CrawlStatistics};

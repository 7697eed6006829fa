//! Link-Crawler: a bounded-concurrency web crawler
//!
//! This crate discovers, normalizes, deduplicates and fetches linked pages
//! starting from a seed address, up to a configurable depth, with retries,
//! domain scoping and a hard cap on simultaneously in-flight requests.

pub mod config;
pub mod crawler;
pub mod output;
pub mod url;

use thiserror::Error;

/// Main error type for crawl operations
///
/// Only conditions that prevent a crawl from starting end up here. Failures
/// of individual URLs are recorded in the [`crawler::CrawlReport`] instead.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid seed URL '{url}': {reason}")]
    InvalidSeed { url: String, reason: String },

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid link pattern: {0}")]
    InvalidPattern(String),
}

/// URL-specific errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UrlError {
    #[error("Malformed URL '{raw}': {reason}")]
    Malformed { raw: String, reason: String },

    #[error("Missing domain in URL '{0}'")]
    MissingDomain(String),
}

/// Errors reported by a [`crawler::Transport`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Connection to {url} failed: {message}")]
    Connect { url: String, message: String },

    #[error("Request to {url} failed: {message}")]
    Request { url: String, message: String },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },
}

impl TransportError {
    /// Returns true if another attempt may succeed
    ///
    /// Rate limiting (429) and server errors (5xx) are transient, as are all
    /// network-level failures. Any other HTTP error status is permanent.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            _ => true,
        }
    }
}

/// Result type alias for crawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

// Re-export commonly used types
pub use crate::config::{Config, CrawlerConfig};
pub use crate::crawler::{CrawlReport, Crawler};
pub use crate::url::{Url, UrlSet};

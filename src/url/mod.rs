//! URL handling module for Link-Crawler
//!
//! This module provides the crawler's URL model: parsing and normalization,
//! resolution of relative links against the page they were found on,
//! validity and crawlability checks, and the deduplication set.
//!
//! # Normalization policy
//!
//! Parsing and relative resolution are done by the `url` crate, so paths
//! and queries come out percent-encoded and stray tabs or newlines are
//! dropped. On top of that:
//!
//! - A trailing dot on the host is dropped, as is the default port
//! - A leading `www.` is stripped from the domain; it is remembered only for
//!   display and for the address that is requested
//! - Duplicate slashes are collapsed
//! - A trailing slash is kept in the path but is not part of the identity
//! - The query string belongs to the path and is part of the identity
//! - The fragment is kept for display but is never part of the identity

mod domain;
mod normalize;
mod set;

use crate::UrlError;
use ::url::{ParseError, Url as ParsedUrl};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

pub use domain::is_valid_domain;
pub use normalize::normalize_path;
pub use set::UrlSet;

use domain::normalize_host;
use normalize::{split_query, strip_trailing_slash};

/// Protocols the crawler can fetch
const CRAWLABLE_PROTOCOLS: &[&str] = &["http", "https"];

/// Extensions of content URLs (never fetched when content skipping is on)
const CONTENT_EXTENSIONS: &[&str] = &[".png", ".pdf", ".jpg", ".jpeg", ".txt"];

/// Default link-extraction pattern
///
/// Matches quoted `href`/`src` attribute values (capture groups 1 and 2) and
/// bare absolute `http(s)://` addresses anywhere in the text (group 3).
static DEFAULT_LINK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:href|src)\s*=\s*(?:"([^"]*)"|'([^']*)')|(https?://[^\s"'<>()]+)"#)
        .expect("hardcoded regex pattern is valid")
});

/// One normalized web address
///
/// A `Url` is immutable once constructed. Its canonical identity is
/// [`Url::get_basic_url`]: protocol, domain and path (query included),
/// without the fragment or a trailing slash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Url {
    raw: String,
    protocol: String,
    domain: String,
    www: bool,
    path: String,
    fragment: Option<String>,
    parent_protocol: String,
    parent_domain: String,
    parent_path: String,
    use_parent_protocol: bool,
    location: ParsedUrl,
}

impl Url {
    /// Parses a seed (absolute) URL
    ///
    /// # Examples
    ///
    /// ```
    /// use link_crawler::url::Url;
    ///
    /// let url = Url::new("HTTPS://www.Example.com//docs/./intro#top").unwrap();
    /// assert_eq!(url.get_basic_url(), "https://example.com/docs/intro");
    /// assert_eq!(url.get_full_url(), "https://www.example.com/docs/intro#top");
    /// ```
    pub fn new(raw: &str) -> Result<Self, UrlError> {
        Self::parse(raw, None, true)
    }

    /// Parses `raw`, resolving it against `parent` when it is relative
    ///
    /// Absolute input goes through [`url::Url::parse`], relative input is
    /// joined onto the parent's address. When `assume_parent_protocol` is
    /// set and an explicit http(s) link points at the parent's own domain,
    /// the parent's protocol is used instead of the explicit one.
    ///
    /// # Errors
    ///
    /// Returns [`UrlError::Malformed`] if no domain can be determined, e.g.
    /// a relative link without a parent or a scheme without an authority
    /// (`mailto:`, `javascript:`), and [`UrlError::MissingDomain`] if the
    /// host is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use link_crawler::url::Url;
    ///
    /// let parent = Url::new("https://a.test/docs/index.html").unwrap();
    /// let url = Url::parse("//a.test/x", Some(&parent), true).unwrap();
    /// assert_eq!(url.get_basic_url(), "https://a.test/x");
    ///
    /// let url = Url::parse("../about", Some(&parent), true).unwrap();
    /// assert_eq!(url.get_basic_url(), "https://a.test/about");
    /// ```
    pub fn parse(
        raw: &str,
        parent: Option<&Url>,
        assume_parent_protocol: bool,
    ) -> Result<Self, UrlError> {
        let trimmed = raw.trim();

        let (parsed, relative) = match ParsedUrl::parse(trimmed) {
            Ok(parsed) => (parsed, false),
            Err(ParseError::RelativeUrlWithoutBase) => match parent {
                Some(parent) => {
                    let joined = parent
                        .location
                        .join(trimmed)
                        .map_err(|e| parse_error(raw, e))?;
                    (joined, true)
                }
                None => {
                    return Err(UrlError::Malformed {
                        raw: raw.to_string(),
                        reason: "relative URL without a parent".to_string(),
                    })
                }
            },
            Err(e) => return Err(parse_error(raw, e)),
        };

        let host = match parsed.host_str() {
            Some("") => return Err(UrlError::MissingDomain(raw.to_string())),
            Some(host) => host,
            None => {
                return Err(UrlError::Malformed {
                    raw: raw.to_string(),
                    reason: format!("scheme '{}' without authority", parsed.scheme()),
                })
            }
        };

        let (host, www) = normalize_host(host);
        if host.is_empty() {
            return Err(UrlError::MissingDomain(raw.to_string()));
        }
        // port() is None for the scheme's default port
        let domain = match parsed.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host,
        };

        let protocol = parsed.scheme().to_string();
        let (protocol, inherited) = match parent {
            Some(parent)
                if !relative
                    && assume_parent_protocol
                    && parent.domain == domain
                    && is_http(&protocol)
                    && is_http(&parent.protocol) =>
            {
                let inherited = protocol != parent.protocol;
                (parent.protocol.clone(), inherited)
            }
            _ => (protocol, relative),
        };

        let mut path = normalize_path(parsed.path());
        if let Some(query) = parsed.query().filter(|q| !q.is_empty()) {
            path.push('?');
            path.push_str(query);
        }

        let fragment = parsed
            .fragment()
            .filter(|f| !f.is_empty())
            .map(|f| f.to_string());

        let (parent_protocol, parent_domain, parent_path) = match parent {
            Some(parent) => (
                parent.protocol.clone(),
                parent.domain.clone(),
                parent.path.clone(),
            ),
            None => (protocol.clone(), domain.clone(), path.clone()),
        };

        // Base for resolving links found on this page
        let location = ParsedUrl::parse(&request_url(&protocol, www, &domain, &path))
            .map_err(|e| parse_error(raw, e))?;

        Ok(Self {
            raw: raw.to_string(),
            protocol,
            domain,
            www,
            path,
            fragment,
            parent_protocol,
            parent_domain,
            parent_path,
            use_parent_protocol: inherited,
            location,
        })
    }

    /// The original string this URL was parsed from
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    /// Lowercase host (without `www.`), with `:port` for non-default ports
    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn has_www(&self) -> bool {
        self.www
    }

    /// Normalized, percent-encoded path, query string included
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    pub fn parent_protocol(&self) -> &str {
        &self.parent_protocol
    }

    pub fn parent_domain(&self) -> &str {
        &self.parent_domain
    }

    pub fn parent_path(&self) -> &str {
        &self.parent_path
    }

    /// True when the protocol was inherited from the parent
    pub fn uses_parent_protocol(&self) -> bool {
        self.use_parent_protocol
    }

    /// Full display form: `protocol://[www.]domain/path[#fragment]`
    pub fn get_full_url(&self) -> String {
        match &self.fragment {
            Some(fragment) => format!("{}#{}", self.get_request_url(), fragment),
            None => self.get_request_url(),
        }
    }

    /// Canonical identity: `protocol://domain/path`, fragment stripped
    ///
    /// This is the key used for deduplication. A trailing slash is dropped
    /// (except for the root), so `/docs` and `/docs/` are one page.
    pub fn get_basic_url(&self) -> String {
        let (path, query) = split_query(&self.path);
        let path = strip_trailing_slash(path);
        match query {
            Some(query) => format!("{}://{}{}?{}", self.protocol, self.domain, path, query),
            None => format!("{}://{}{}", self.protocol, self.domain, path),
        }
    }

    /// The address handed to the transport: the full URL without fragment
    pub fn get_request_url(&self) -> String {
        request_url(&self.protocol, self.www, &self.domain, &self.path)
    }

    /// True iff the protocol is http/https and the domain is a valid hostname
    pub fn is_valid(&self) -> bool {
        CRAWLABLE_PROTOCOLS.contains(&self.protocol.as_str()) && is_valid_domain(&self.domain)
    }

    /// True iff the URL is valid and, when filtering, on the seed's domain
    pub fn is_crawlable(&self, seed_domain: &str, domain_filter: bool) -> bool {
        self.is_valid() && (!domain_filter || self.domain == seed_domain)
    }

    /// True if the URL points at a png, pdf, jpg, jpeg or txt document
    pub fn is_content(&self) -> bool {
        let (path, _) = split_query(&self.path);
        let path = path.to_lowercase();
        CONTENT_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
    }

    /// The default link-extraction pattern
    pub fn default_regex() -> &'static Regex {
        &DEFAULT_LINK_REGEX
    }
}

impl fmt::Display for Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.get_full_url())
    }
}

fn is_http(protocol: &str) -> bool {
    CRAWLABLE_PROTOCOLS.contains(&protocol)
}

fn request_url(protocol: &str, www: bool, domain: &str, path: &str) -> String {
    let www = if www { "www." } else { "" };
    format!("{}://{}{}{}", protocol, www, domain, path)
}

fn parse_error(raw: &str, error: ParseError) -> UrlError {
    match error {
        ParseError::EmptyHost => UrlError::MissingDomain(raw.to_string()),
        other => UrlError::Malformed {
            raw: raw.to_string(),
            reason: other.to_string(),
        },
    }
}

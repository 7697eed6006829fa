use crate::config::types::{Config, CrawlerConfig};
use crate::url::Url;
use crate::ConfigError;
use regex::Regex;
use std::collections::HashMap;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_headers(&config.headers)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    validate_seed_url(&config.url)?;

    if config.max_runners < 1 {
        return Err(ConfigError::Validation(format!(
            "max_runners must be >= 1, got {}",
            config.max_runners
        )));
    }

    if let Some(limit) = config.concurrent_requests_limit {
        if limit < 1 {
            return Err(ConfigError::Validation(format!(
                "concurrent_requests_limit must be >= 1, got {}",
                limit
            )));
        }
    }

    if config.request_timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "request_timeout must be > 0ms".to_string(),
        ));
    }

    if let Some(pattern) = &config.link_pattern {
        Regex::new(pattern)
            .map_err(|e| ConfigError::InvalidPattern(format!("'{}': {}", pattern, e)))?;
    }

    Ok(())
}

/// Validates the seed URL: it must parse and be a valid http(s) address
fn validate_seed_url(raw: &str) -> Result<(), ConfigError> {
    if raw.trim().is_empty() {
        return Err(ConfigError::InvalidUrl("seed url cannot be empty".to_string()));
    }

    let url = Url::new(raw).map_err(|e| ConfigError::InvalidUrl(e.to_string()))?;

    if !url.is_valid() {
        return Err(ConfigError::InvalidUrl(format!(
            "Seed URL '{}' must be an http(s) URL with a valid domain",
            raw
        )));
    }

    Ok(())
}

/// Validates request headers
fn validate_headers(headers: &HashMap<String, String>) -> Result<(), ConfigError> {
    for (name, value) in headers {
        if name.is_empty() {
            return Err(ConfigError::Validation(
                "header names cannot be empty".to_string(),
            ));
        }

        if !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "!#$%&'*+-.^_`|~".contains(c))
        {
            return Err(ConfigError::Validation(format!(
                "header name '{}' contains invalid characters",
                name
            )));
        }

        if value.contains(['\r', '\n']) {
            return Err(ConfigError::Validation(format!(
                "header '{}' has a value spanning multiple lines",
                name
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_defaults() {
        assert!(validate(&Config::new("https://example.com")).is_ok());
    }

    #[test]
    fn test_validate_seed_url() {
        assert!(validate_seed_url("https://example.com").is_ok());
        assert!(validate_seed_url("http://127.0.0.1:8080/").is_ok());

        assert!(validate_seed_url("").is_err());
        assert!(validate_seed_url("example.com").is_err());
        assert!(validate_seed_url("ftp://example.com").is_err());
        assert!(validate_seed_url("https://example").is_err());
    }

    #[test]
    fn test_zero_runners_rejected() {
        let mut config = Config::new("https://example.com");
        config.crawler.max_runners = 0;
        assert!(matches!(validate(&config), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_zero_request_limit_rejected() {
        let mut config = Config::new("https://example.com");
        config.crawler.concurrent_requests_limit = Some(0);
        assert!(matches!(validate(&config), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let mut config = Config::new("https://example.com");
        config.crawler.link_pattern = Some("href=(".to_string());
        assert!(matches!(
            validate(&config),
            Err(ConfigError::InvalidPattern(_))
        ));
    }

    #[test]
    fn test_validate_headers() {
        let mut headers = HashMap::new();
        headers.insert("User-Agent".to_string(), "test".to_string());
        assert!(validate_headers(&headers).is_ok());

        headers.insert("Bad Header".to_string(), "x".to_string());
        assert!(validate_headers(&headers).is_err());

        let mut headers = HashMap::new();
        headers.insert("X-Test".to_string(), "a\r\nb".to_string());
        assert!(validate_headers(&headers).is_err());

        let mut headers = HashMap::new();
        headers.insert(String::new(), "x".to_string());
        assert!(validate_headers(&headers).is_err());
    }
}

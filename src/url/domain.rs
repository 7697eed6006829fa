use url::Host;

/// Normalizes a parsed host
///
/// The host is lowercased, a trailing dot is removed and a leading `www.` is
/// stripped. Returns the remaining host and whether `www.` was present.
pub(crate) fn normalize_host(host: &str) -> (String, bool) {
    let host = host.to_lowercase();
    let host = host.trim_end_matches('.');

    match host.strip_prefix("www.") {
        Some(rest) if !rest.is_empty() => (rest.to_string(), true),
        _ => (host.to_string(), false),
    }
}

/// Checks whether a normalized domain (`host[:port]`) is a valid hostname
///
/// Accepts IPv4 and bracketed IPv6 literals, `localhost`, and dotted domain
/// names whose labels are made of alphanumerics, hyphens and underscores and
/// don't start or end with a hyphen.
///
/// # Examples
///
/// ```
/// use link_crawler::url::is_valid_domain;
///
/// assert!(is_valid_domain("example.com"));
/// assert!(is_valid_domain("127.0.0.1:8080"));
/// assert!(!is_valid_domain("example"));
/// assert!(!is_valid_domain("exa mple.com"));
/// ```
pub fn is_valid_domain(domain: &str) -> bool {
    let (host, port) = split_host_port(domain);

    if let Some(port) = port {
        if port.parse::<u16>().is_err() {
            return false;
        }
    }

    match Host::parse(host) {
        Ok(Host::Ipv4(_)) | Ok(Host::Ipv6(_)) => true,
        Ok(Host::Domain(name)) => name == "localhost" || is_valid_domain_name(&name),
        Err(_) => false,
    }
}

/// Validates a dotted domain name
fn is_valid_domain_name(name: &str) -> bool {
    // Must contain at least one dot (e.g., example.com, not just "example")
    if !name.contains('.') {
        return false;
    }

    name.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label
                .chars()
                .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    })
}

/// Splits `host[:port]`, taking care of bracketed IPv6 literals
fn split_host_port(host_port: &str) -> (&str, Option<&str>) {
    if host_port.starts_with('[') {
        return match host_port.find(']') {
            Some(end) => {
                let host = &host_port[..=end];
                let port = host_port[end + 1..].strip_prefix(':');
                (host, port)
            }
            None => (host_port, None),
        };
    }

    match host_port.rsplit_once(':') {
        Some((host, port)) => (host, Some(port)),
        None => (host_port, None),
    }
}

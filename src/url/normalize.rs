//! Path normalization helpers

/// Normalizes an already parsed, percent-encoded path
///
/// # Normalization Steps
///
/// 1. Collapse duplicate slashes
/// 2. Remove dot segments (`.` and `..`); `..` never climbs above the root
/// 3. Keep a trailing slash if the input had one (or ended in a dot segment)
/// 4. Empty path becomes `/`
///
/// The trailing slash stays in the path so relative links resolve against
/// the right directory; [`super::Url::get_basic_url`] drops it from the
/// identity.
///
/// # Examples
///
/// ```
/// use link_crawler::url::normalize_path;
///
/// assert_eq!(normalize_path("//a/./b/../c"), "/a/c");
/// assert_eq!(normalize_path("/docs/"), "/docs/");
/// ```
pub fn normalize_path(path: &str) -> String {
    let trailing_slash = path.ends_with('/')
        || path.ends_with("/.")
        || path.ends_with("/..")
        || path == "."
        || path == "..";

    let mut normalized_segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            // Skip empty segments (from multiple slashes) and current directory markers
            "" | "." => continue,
            ".." => {
                normalized_segments.pop();
            }
            _ => normalized_segments.push(segment),
        }
    }

    let mut result = format!("/{}", normalized_segments.join("/"));
    if trailing_slash && !normalized_segments.is_empty() {
        result.push('/');
    }
    result
}

/// Drops a trailing slash from a path (root excluded)
pub(crate) fn strip_trailing_slash(path: &str) -> &str {
    match path.strip_suffix('/') {
        Some(stripped) if !stripped.is_empty() => stripped,
        _ => path,
    }
}

/// Splits a path into its path and query components
pub(crate) fn split_query(path: &str) -> (&str, Option<&str>) {
    match path.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (path, None),
    }
}

use super::Url;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Concurrency-safe set of URLs keyed by canonical identity
///
/// The set is the crawl's memory of everything already scheduled. Its only
/// mutating operation, [`UrlSet::add`], is an atomic check-and-insert: of
/// any number of concurrent callers adding the same canonical URL, exactly
/// one observes `true`.
#[derive(Debug, Default)]
pub struct UrlSet {
    items: Mutex<HashMap<String, Url>>,
}

impl UrlSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `url` keyed by [`Url::get_basic_url`]
    ///
    /// Returns `true` if the URL was not present (the caller must schedule
    /// it) and `false` if it already was (the caller must drop it).
    ///
    /// # Examples
    ///
    /// ```
    /// use link_crawler::url::{Url, UrlSet};
    ///
    /// let set = UrlSet::new();
    /// assert!(set.add(&Url::new("https://a.test/page#one").unwrap()));
    /// assert!(!set.add(&Url::new("https://a.test/page#two").unwrap()));
    /// ```
    pub fn add(&self, url: &Url) -> bool {
        let key = url.get_basic_url();
        let mut items = self.lock();
        if items.contains_key(&key) {
            return false;
        }
        items.insert(key, url.clone());
        true
    }

    /// Returns true if a URL with this canonical key is present
    pub fn contains(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    /// Snapshot of the canonical keys
    ///
    /// Taken during an active crawl this is a best-effort view only.
    pub fn keys(&self) -> HashSet<String> {
        self.lock().keys().cloned().collect()
    }

    /// Snapshot of the stored URLs
    pub fn values(&self) -> Vec<Url> {
        self.lock().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Url>> {
        // The map is never left half-updated, so a poisoned lock is still usable
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl FromIterator<Url> for UrlSet {
    fn from_iter<I: IntoIterator<Item = Url>>(iter: I) -> Self {
        let set = Self::new();
        for url in iter {
            set.add(&url);
        }
        set
    }
}

//! Frontier queue shared by the crawl workers
//!
//! This module handles:
//! - FIFO queue of discovered-but-not-yet-fetched URLs
//! - Blocking pop while other workers may still produce work
//! - Termination detection through an outstanding-work counter

use crate::url::Url;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;

/// A URL waiting in the frontier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    /// The URL to fetch
    pub url: Url,

    /// Link distance from the seed
    pub depth: u32,
}

/// A frontier entry claimed by a worker
///
/// Dropping the claim marks the entry as fully processed, so children must
/// be pushed before the claim goes away.
#[derive(Debug)]
pub struct Claimed<'a> {
    frontier: &'a Frontier,
    entry: FrontierEntry,
}

impl Claimed<'_> {
    pub fn entry(&self) -> &FrontierEntry {
        &self.entry
    }
}

impl Drop for Claimed<'_> {
    fn drop(&mut self) {
        self.frontier.complete();
    }
}

/// Frontier of the crawl
///
/// Outstanding work is the number of queued entries plus the entries that
/// have been claimed but not yet completed. It is incremented before an
/// entry becomes visible and decremented only after the entry (and every
/// child it produced) has been handled, so it reaches zero exactly once: when
/// the crawl is done.
#[derive(Debug, Default)]
pub struct Frontier {
    queue: Mutex<VecDeque<FrontierEntry>>,
    outstanding: AtomicUsize,
    notify: Notify,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a URL to the back of the frontier
    pub fn push(&self, url: Url, depth: u32) {
        self.outstanding.fetch_add(1, Ordering::SeqCst);
        self.lock().push_back(FrontierEntry { url, depth });
        self.notify.notify_waiters();
    }

    /// Waits for the next entry
    ///
    /// # Returns
    ///
    /// * `Some(Claimed)` - An entry to process
    /// * `None` - No entry is queued and no claimed entry is in progress,
    ///   so no more work can ever arrive
    pub async fn pop(&self) -> Option<Claimed<'_>> {
        loop {
            // Register for wake-ups before looking, so a push or completion
            // between the check and the await is not missed
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Some(entry) = self.lock().pop_front() {
                return Some(Claimed {
                    frontier: self,
                    entry,
                });
            }

            if self.outstanding.load(Ordering::SeqCst) == 0 {
                return None;
            }

            notified.await;
        }
    }

    /// Removes every queued entry without processing it
    ///
    /// Used after cancellation. The removed entries no longer count as
    /// outstanding work.
    pub fn drain(&self) -> Vec<FrontierEntry> {
        let drained: Vec<FrontierEntry> = self.lock().drain(..).collect();
        if !drained.is_empty() {
            self.outstanding.fetch_sub(drained.len(), Ordering::SeqCst);
            self.notify.notify_waiters();
        }
        drained
    }

    /// Returns the number of queued entries
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns whether nothing is queued
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Returns queued plus in-progress entries
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }

    fn complete(&self) {
        if self.outstanding.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.notify.notify_waiters();
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<FrontierEntry>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

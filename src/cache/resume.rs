//! Resume link cache
//!
//! Presigned resume URLs are cached under two fixed keys: the URL itself and
//! its expiry in epoch milliseconds. Both are always written together. Reads
//! past the expiry purge both keys; `peek_stale` reads the URL regardless.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use tracing::{debug, warn};

use super::KeyValueStore;
use crate::clock::{Clock, SystemClock};

/// Key holding the cached URL
pub const URL_KEY: &str = "resumeUrl";

/// Key holding the URL's expiry as epoch milliseconds
pub const EXPIRY_KEY: &str = "resumeUrlExpiry";

/// A cached resume link and when it stops being served
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResumeUrl {
    pub url: String,
    pub expires_at: DateTime<Utc>,
}

impl CachedResumeUrl {
    /// Whether the entry may be served at `now`
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Storage for the resume link, as seen by the resolver
pub trait ResumeCache: Send + Sync {
    /// Returns the URL iff stored and unexpired; otherwise purges and returns `None`
    fn get(&self) -> Option<String>;

    /// Stores the URL with a fresh expiry, replacing any previous entry
    fn put(&self, url: &str);

    /// Returns whatever URL is stored, ignoring expiry. Never purges.
    fn peek_stale(&self) -> Option<String>;

    /// Returns the stored entry without checking or purging
    fn entry(&self) -> Option<CachedResumeUrl>;

    /// Removes the stored entry
    fn clear(&self);
}

/// `ResumeCache` over any `KeyValueStore`
pub struct StoredResumeCache<S> {
    store: S,
    duration: Duration,
    clock: Arc<dyn Clock>,
}

impl<S: KeyValueStore> StoredResumeCache<S> {
    /// Creates a cache that keeps entries for `duration`, using wall-clock time
    pub fn new(store: S, duration: Duration) -> Self {
        Self::with_clock(store, duration, Arc::new(SystemClock))
    }

    /// Creates a cache with a custom time source
    pub fn with_clock(store: S, duration: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            duration,
            clock,
        }
    }

    /// The underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    fn purge(&self) {
        for key in [URL_KEY, EXPIRY_KEY] {
            if let Err(e) = self.store.remove_item(key) {
                warn!("Failed to remove cached {}: {}", key, e);
            }
        }
    }
}

impl<S: KeyValueStore> ResumeCache for StoredResumeCache<S> {
    fn get(&self) -> Option<String> {
        match self.entry() {
            Some(entry) if entry.is_valid_at(self.clock.now()) => Some(entry.url),
            Some(entry) => {
                debug!("Cached resume URL expired at {}", entry.expires_at);
                self.purge();
                None
            }
            None => {
                // Half-written or corrupt entries are dropped too
                if self.store.get_item(URL_KEY).is_some()
                    || self.store.get_item(EXPIRY_KEY).is_some()
                {
                    debug!("Discarding incomplete resume cache entry");
                    self.purge();
                }
                None
            }
        }
    }

    fn put(&self, url: &str) {
        let Some(expires_at) = self.clock.now().checked_add_signed(self.duration) else {
            warn!("Resume URL expiry out of range, not caching");
            return;
        };
        let expiry = expires_at.timestamp_millis().to_string();
        // Write expiry first so a failed write never leaves a URL without one
        let result = self
            .store
            .set_item(EXPIRY_KEY, &expiry)
            .and_then(|()| self.store.set_item(URL_KEY, url));
        match result {
            Ok(()) => debug!("Cached resume URL until {}", expires_at),
            Err(e) => {
                warn!("Failed to cache resume URL: {}", e);
                self.purge();
            }
        }
    }

    fn peek_stale(&self) -> Option<String> {
        self.store.get_item(URL_KEY)
    }

    fn entry(&self) -> Option<CachedResumeUrl> {
        let url = self.store.get_item(URL_KEY)?;
        let millis = self.store.get_item(EXPIRY_KEY)?.trim().parse::<i64>().ok()?;
        let expires_at = Utc.timestamp_millis_opt(millis).single()?;
        Some(CachedResumeUrl { url, expires_at })
    }

    fn clear(&self) {
        self.purge();
    }
}

//! Cache module for storing API responses to disk
//!
//! The `CacheManager` persists JSON entries with a time-to-live and plain
//! string items under the user's cache directory. The resume link cache is
//! layered on top of any string store and enforces its own expiry.

mod manager;
pub mod resume;

pub use manager::{CacheManager, CachedData, KeyValueStore, MemoryStore};
pub use resume::{CachedResumeUrl, ResumeCache, StoredResumeCache};

//! Reply cache for the Landsat data routes
//!
//! Bounds, metadata and tiles are pure functions of the scene and the decoded
//! request, so successful replies are kept in a bounded LRU shared by all
//! workers. Failures are never cached.

use std::fmt;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use lru::LruCache;

use crate::handler::{HandlerResult, Reply};

/// Replies kept when no size is configured
pub const DEFAULT_CACHE_SIZE: usize = 128;

/// One cacheable request: the route plus every decoded input
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    route: &'static str,
    inputs: String,
}

impl CacheKey {
    pub fn new(route: &'static str, inputs: &impl fmt::Debug) -> Self {
        Self {
            route,
            inputs: format!("{inputs:?}"),
        }
    }
}

/// Thread-safe bounded cache of successful replies
#[derive(Clone)]
pub struct ReplyCache {
    /// `None` when caching is disabled
    entries: Option<Arc<Mutex<LruCache<CacheKey, Reply>>>>,
}

impl ReplyCache {
    /// Cache holding up to `capacity` replies; zero disables caching
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: NonZeroUsize::new(capacity)
                .map(|capacity| Arc::new(Mutex::new(LruCache::new(capacity)))),
        }
    }

    pub const fn disabled() -> Self {
        Self { entries: None }
    }

    /// The cached reply for `key`, or the result of `compute`, kept only if
    /// it succeeded
    pub fn get_or_try_insert(
        &self,
        key: CacheKey,
        compute: impl FnOnce() -> HandlerResult,
    ) -> HandlerResult {
        let Some(entries) = &self.entries else {
            return compute();
        };

        if let Some(hit) = lock(entries).get(&key).cloned() {
            return Ok(hit);
        }

        // Computed without holding the lock; racing misses both render
        let reply = compute()?;
        lock(entries).put(key, reply.clone());
        Ok(reply)
    }

    pub fn len(&self) -> usize {
        self.entries.as_ref().map_or(0, |entries| lock(entries).len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.entries
            .as_ref()
            .map_or(0, |entries| lock(entries).cap().get())
    }
}

impl Default for ReplyCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_SIZE)
    }
}

impl fmt::Debug for ReplyCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReplyCache")
            .field("capacity", &self.capacity())
            .field("len", &self.len())
            .finish()
    }
}

/// A panicking handler never runs under the lock, so poison carries no
/// broken state
fn lock(entries: &Mutex<LruCache<CacheKey, Reply>>) -> MutexGuard<'_, LruCache<CacheKey, Reply>> {
    entries.lock().unwrap_or_else(PoisonError::into_inner)
}

//! Bounded LRU memoization in front of any [`Provider`].

use std::num::NonZeroUsize;

use lru::LruCache;
use parking_lot::Mutex;
use serde::Serialize;
use tracing::trace;

use crate::body::Body;
use crate::provider::{Provider, ProviderError};
use crate::sample::{AngularSample, TimeScale};

/// Key: body plus the exact bit pattern of the epoch. Searches re-probe
/// bit-identical epochs (grid points, bracket ends), so no rounding is done.
type CacheKey = (Body, u64);

/// Counters reported by [`CachedProvider::stats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub len: usize,
}

struct CacheState {
    entries: LruCache<CacheKey, AngularSample>,
    hits: u64,
    misses: u64,
    evictions: u64,
}

/// Wraps a provider with a bounded least-recently-used cache.
///
/// The cache is owned by the wrapper and guarded by a mutex, so a single
/// `CachedProvider` can be shared (`&` or `Arc`) by concurrent scans.
/// Errors are never cached. The lock is not held while the inner provider
/// computes.
pub struct CachedProvider<P> {
    inner: P,
    state: Mutex<CacheState>,
}

impl<P> std::fmt::Debug for CachedProvider<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = self.state.lock();
        f.debug_struct("CachedProvider")
            .field("capacity", &s.entries.cap())
            .field("len", &s.entries.len())
            .finish()
    }
}

impl<P: Provider> CachedProvider<P> {
    pub fn new(inner: P, capacity: usize) -> Result<Self, ProviderError> {
        let capacity = NonZeroUsize::new(capacity).ok_or(ProviderError::InvalidConfig(
            "cache capacity must be greater than zero",
        ))?;
        Ok(Self {
            inner,
            state: Mutex::new(CacheState {
                entries: LruCache::new(capacity),
                hits: 0,
                misses: 0,
                evictions: 0,
            }),
        })
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    pub fn capacity(&self) -> usize {
        self.state.lock().entries.cap().get()
    }

    pub fn stats(&self) -> CacheStats {
        let s = self.state.lock();
        CacheStats {
            hits: s.hits,
            misses: s.misses,
            evictions: s.evictions,
            len: s.entries.len(),
        }
    }

    /// Drop every cached sample; counters are kept.
    pub fn clear(&self) {
        let mut s = self.state.lock();
        s.entries.clear();
    }
}

impl<P: Provider> Provider for CachedProvider<P> {
    fn sample(&self, body: Body, jd: f64) -> Result<AngularSample, ProviderError> {
        let key = (body, jd.to_bits());
        {
            let mut s = self.state.lock();
            if let Some(hit) = s.entries.get(&key).copied() {
                s.hits += 1;
                return Ok(hit);
            }
            s.misses += 1;
        }

        let sample = self.inner.sample(body, jd)?;

        let mut s = self.state.lock();
        if let Some((old, _)) = s.entries.push(key, sample) {
            if old != key {
                s.evictions += 1;
                trace!(body = %old.0, jd = f64::from_bits(old.1), "cache eviction");
            }
        }
        Ok(sample)
    }

    fn supports(&self, body: Body) -> bool {
        self.inner.supports(body)
    }

    fn mean_period_days(&self, body: Body) -> Option<f64> {
        self.inner.mean_period_days(body)
    }

    fn time_scale(&self) -> TimeScale {
        self.inner.time_scale()
    }
}

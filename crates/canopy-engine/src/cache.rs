//! Read-through resolution cache
//!
//! Entries are keyed by `(page, slot, mode, as_of bucket)` and hold the
//! resolution computed at the bucket's floor instant, so every caller
//! inside one bucket sees the same answer. The cache doubles as the
//! lifecycle manager's invalidation hook: a publish drops every entry whose
//! chain includes the page, a saved draft drops only preview entries.
//! An invalidation that lands while a miss is loading discards the loaded
//! entry, since the loader may have read the pre-invalidation state.

use canopy_core::errors::{ExError, ExResult};
use canopy_core::model::{ResolutionMode, ResolvedSlot};
use canopy_core::ports::InvalidationHook;
use canopy_core::resolver::SlotRequest;
use canopy_core::config::CacheConfig;
use chrono::{DateTime, Utc};
use moka::sync::Cache;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    page_id: String,
    slot_name: String,
    mode: ResolutionMode,
    bucket: i64,
}

/// Statistics for cache monitoring
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Approximate number of live entries
    pub entry_count: u64,
    /// Number of resolutions computed because no entry was present
    pub misses: u64,
}

/// TTL cache over slot resolutions
pub struct ResolutionCache {
    inner: Option<Cache<CacheKey, Arc<ResolvedSlot>>>,
    bucket_secs: i64,
    misses: AtomicU64,
    /// Bumped by every invalidation
    epoch: AtomicU64,
}

impl ResolutionCache {
    /// Build a cache from configuration; a disabled cache resolves every call
    pub fn new(config: &CacheConfig) -> Self {
        let inner = config.enabled.then(|| {
            Cache::builder()
                .max_capacity(config.max_capacity)
                .time_to_live(Duration::from_secs(config.ttl_secs))
                .support_invalidation_closures()
                .build()
        });
        Self {
            inner,
            bucket_secs: i64::try_from(config.as_of_bucket_secs.max(1)).unwrap_or(i64::MAX),
            misses: AtomicU64::new(0),
            epoch: AtomicU64::new(0),
        }
    }

    /// Whether resolutions are cached at all
    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    /// Bucket index and floor instant of a reference time
    pub fn bucket_of(&self, as_of: DateTime<Utc>) -> (i64, DateTime<Utc>) {
        let bucket = as_of.timestamp().div_euclid(self.bucket_secs);
        let floor = DateTime::from_timestamp(bucket.saturating_mul(self.bucket_secs), 0)
            .unwrap_or(as_of);
        (bucket, floor)
    }

    /// Return the cached resolution for a request, computing it on a miss
    ///
    /// Concurrent misses on one key run `resolve` once.
    ///
    /// # Errors
    /// Whatever `resolve` returns; failures are not cached.
    pub fn get_or_resolve<F>(&self, request: &SlotRequest, resolve: F) -> ExResult<Arc<ResolvedSlot>>
    where
        F: FnOnce(&SlotRequest) -> ExResult<ResolvedSlot>,
    {
        let Some(inner) = &self.inner else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            return resolve(request).map(Arc::new);
        };

        let (bucket, floor) = self.bucket_of(request.as_of);
        let key = CacheKey {
            page_id: request.page_id.clone(),
            slot_name: request.slot_name.clone(),
            mode: request.mode,
            bucket,
        };

        let mut loaded_at_epoch = None;
        let resolved = inner
            .try_get_with(key.clone(), || {
                self.misses.fetch_add(1, Ordering::Relaxed);
                loaded_at_epoch = Some(self.epoch.load(Ordering::SeqCst));
                debug!(
                    page_id = %request.page_id,
                    slot = %request.slot_name,
                    mode = %request.mode,
                    bucket,
                    "resolution cache miss"
                );
                let at_floor = SlotRequest {
                    as_of: floor,
                    ..request.clone()
                };
                resolve(&at_floor).map(Arc::new)
            })
            .map_err(|err: Arc<ExError>| Arc::try_unwrap(err).unwrap_or_else(|shared| (*shared).clone()))?;

        if let Some(epoch) = loaded_at_epoch {
            if epoch != self.epoch.load(Ordering::SeqCst) {
                debug!(
                    page_id = %request.page_id,
                    slot = %request.slot_name,
                    "invalidated during load, entry discarded"
                );
                inner.invalidate(&key);
            }
        }
        Ok(resolved)
    }

    /// Drop entries whose resolution consulted `page_id`
    pub fn invalidate_page(&self, page_id: &str, modes: &[ResolutionMode]) {
        let Some(inner) = &self.inner else {
            return;
        };
        self.epoch.fetch_add(1, Ordering::SeqCst);
        let page_id = page_id.to_string();
        let modes = modes.to_vec();
        let target = page_id.clone();
        if let Err(err) = inner.invalidate_entries_if(move |key, slot| {
            modes.contains(&key.mode) && slot.involves_page(&target)
        }) {
            warn!(page_id = %page_id, error = %err, "cache invalidation rejected, clearing cache");
            inner.invalidate_all();
        }
    }

    /// Drop every entry
    pub fn invalidate_all(&self) {
        if let Some(inner) = &self.inner {
            self.epoch.fetch_add(1, Ordering::SeqCst);
            inner.invalidate_all();
        }
    }

    /// Current entry count and miss total
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entry_count: self.inner.as_ref().map_or(0, |c| {
                c.run_pending_tasks();
                c.entry_count()
            }),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl InvalidationHook for ResolutionCache {
    fn on_published(&self, page_id: &str) {
        self.invalidate_page(page_id, &[ResolutionMode::Live, ResolutionMode::Preview]);
    }

    fn on_draft_saved(&self, page_id: &str) {
        self.invalidate_page(page_id, &[ResolutionMode::Preview]);
    }
}

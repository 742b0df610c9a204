//! Engine facade
//!
//! One object holding the three stores, the resolution cache and the
//! configuration. Every lifecycle write goes through the core lifecycle
//! manager with the cache as its invalidation hook, so cached resolutions
//! never outlive the versions they were computed from.

#![allow(clippy::result_large_err)]

use canopy_core::config::CanopyConfig;
use canopy_core::diff::VersionDiff;
use canopy_core::errors::ExResult;
use canopy_core::lifecycle::{self, RestoreMode};
use canopy_core::model::{PublishOutcome, ResolvedSlot, Version, VersionContent};
use canopy_core::ports::{PageHierarchy, SlotPolicyRegistry, VersionStore};
use canopy_core::resolver::{self, SlotRequest};
use canopy_store::SqliteStore;
use chrono::{DateTime, Utc};
use std::path::Path;
use std::sync::Arc;

use crate::cache::ResolutionCache;

/// Resolution and lifecycle entry point over a set of stores
pub struct Engine {
    hierarchy: Arc<dyn PageHierarchy>,
    versions: Arc<dyn VersionStore>,
    policies: Arc<dyn SlotPolicyRegistry>,
    cache: ResolutionCache,
    config: CanopyConfig,
}

impl Engine {
    /// Build an engine over separate store implementations
    pub fn new(
        hierarchy: Arc<dyn PageHierarchy>,
        versions: Arc<dyn VersionStore>,
        policies: Arc<dyn SlotPolicyRegistry>,
        config: CanopyConfig,
    ) -> Self {
        Self {
            hierarchy,
            versions,
            policies,
            cache: ResolutionCache::new(&config.cache),
            config,
        }
    }

    /// Build an engine over one store implementing all three traits
    pub fn from_store<S>(store: Arc<S>, config: CanopyConfig) -> Self
    where
        S: PageHierarchy + VersionStore + SlotPolicyRegistry + 'static,
    {
        Self::new(store.clone(), store.clone(), store, config)
    }

    /// Open a SQLite database and build an engine over it
    ///
    /// # Errors
    /// `Persistence` if the database cannot be opened or migrated.
    pub fn open_sqlite(path: &Path, config: CanopyConfig) -> ExResult<(Self, Arc<SqliteStore>)> {
        let store = Arc::new(SqliteStore::open(path)?);
        Ok((Self::from_store(store.clone(), config), store))
    }

    /// Configuration the engine was built with
    pub fn config(&self) -> &CanopyConfig {
        &self.config
    }

    /// The resolution cache, also the lifecycle invalidation hook
    pub fn cache(&self) -> &ResolutionCache {
        &self.cache
    }

    /// Resolve a slot, served from the cache when possible
    ///
    /// With caching enabled the result is computed at the floor of the
    /// request's `as_of` bucket.
    ///
    /// # Errors
    /// `NotFound` for an unknown target page.
    pub fn resolve_slot(&self, request: &SlotRequest) -> ExResult<Arc<ResolvedSlot>> {
        self.cache.get_or_resolve(request, |request| {
            resolver::resolve_slot(
                self.hierarchy.as_ref(),
                self.versions.as_ref(),
                self.policies.as_ref(),
                request,
            )
        })
    }

    /// # Errors
    /// See [`lifecycle::create_draft`].
    pub fn create_draft(&self, page_id: &str, base_version_id: Option<&str>) -> ExResult<Version> {
        lifecycle::create_draft(
            self.hierarchy.as_ref(),
            self.versions.as_ref(),
            &self.cache,
            page_id,
            base_version_id,
        )
    }

    /// # Errors
    /// See [`lifecycle::save_draft`].
    pub fn save_draft(&self, page_id: &str, content: VersionContent) -> ExResult<Version> {
        lifecycle::save_draft(
            self.hierarchy.as_ref(),
            self.versions.as_ref(),
            self.policies.as_ref(),
            &self.cache,
            page_id,
            content,
        )
    }

    /// Publish a draft now
    ///
    /// # Errors
    /// See [`lifecycle::publish`].
    pub fn publish(&self, version_id: &str) -> ExResult<PublishOutcome> {
        self.publish_at(version_id, Utc::now())
    }

    /// # Errors
    /// See [`lifecycle::publish`].
    pub fn publish_at(&self, version_id: &str, at: DateTime<Utc>) -> ExResult<PublishOutcome> {
        lifecycle::publish(self.versions.as_ref(), &self.cache, version_id, at)
    }

    /// Restore with the configured restore mode
    ///
    /// # Errors
    /// See [`lifecycle::restore`].
    pub fn restore(&self, page_id: &str, historical_version_id: &str) -> ExResult<Version> {
        self.restore_with_mode(page_id, historical_version_id, self.config.lifecycle.restore_mode)
    }

    /// # Errors
    /// See [`lifecycle::restore`].
    pub fn restore_with_mode(
        &self,
        page_id: &str,
        historical_version_id: &str,
        mode: RestoreMode,
    ) -> ExResult<Version> {
        lifecycle::restore(
            self.hierarchy.as_ref(),
            self.versions.as_ref(),
            &self.cache,
            page_id,
            historical_version_id,
            mode,
        )
    }

    /// # Errors
    /// See [`lifecycle::compare`].
    pub fn compare(&self, version_a_id: &str, version_b_id: &str) -> ExResult<VersionDiff> {
        lifecycle::compare(self.versions.as_ref(), version_a_id, version_b_id)
    }
}

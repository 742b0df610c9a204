//! Store and hook traits consumed by the resolver and the lifecycle manager
//!
//! The page tree, the version history and the slot policy registry live
//! outside the engine. Reference implementations are `ops::Store` (memory)
//! and `canopy_store::SqliteStore`.

use chrono::{DateTime, Utc};

use crate::errors::ExResult;
use crate::model::{Page, PublishOutcome, SlotPolicy, Version, VersionContent, VersionStatus};

/// Read access to the page tree
pub trait PageHierarchy: Send + Sync {
    /// Fetch a page
    ///
    /// # Errors
    ///
    /// `NotFound` if the page does not exist.
    fn get_page(&self, page_id: &str) -> ExResult<Page>;

    /// Parent of a page, `None` for the root
    ///
    /// # Errors
    ///
    /// `NotFound` if the page does not exist.
    fn get_parent(&self, page_id: &str) -> ExResult<Option<String>>;

    /// Ancestors of a page, nearest first, root last, excluding the page itself
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown page, `TraversalBroken` if a parent pointer
    /// dangles, `CycleDetected` if parent pointers loop.
    fn get_ancestor_chain(&self, page_id: &str) -> ExResult<Vec<String>>;
}

/// Append-only version history with an atomic publish swap
pub trait VersionStore: Send + Sync {
    /// The page's current published version, if any
    ///
    /// # Errors
    ///
    /// `InconsistentState` if more than one version is published.
    fn get_published_version(&self, page_id: &str) -> ExResult<Option<Version>>;

    /// The page's highest-sequence draft, if any
    ///
    /// # Errors
    ///
    /// `Persistence` or `Concurrency` on store failure.
    fn get_latest_draft(&self, page_id: &str) -> ExResult<Option<Version>>;

    /// Fetch a version by ID
    ///
    /// # Errors
    ///
    /// `NotFound` if the version does not exist.
    fn get_version(&self, version_id: &str) -> ExResult<Version>;

    /// All versions of a page in sequence order
    ///
    /// # Errors
    ///
    /// `Persistence` or `Concurrency` on store failure.
    fn list_versions(&self, page_id: &str) -> ExResult<Vec<Version>>;

    /// Append a new version, assigning its ID, sequence and creation time
    ///
    /// A `Published` status performs the publish swap in the same critical
    /// section.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` for an `Archived` status.
    fn put_version(
        &self,
        page_id: &str,
        content: VersionContent,
        status: VersionStatus,
        restored_from: Option<&str>,
    ) -> ExResult<Version>;

    /// Atomically archive the current version and publish a draft
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown version, `InvalidTransition` if the version
    /// is no longer a draft when the swap runs.
    fn promote(&self, version_id: &str, at: DateTime<Utc>) -> ExResult<PublishOutcome>;
}

/// Read-only slot policy configuration
pub trait SlotPolicyRegistry: Send + Sync {
    /// Policy for a layout's slot, `None` when nothing is registered
    ///
    /// # Errors
    ///
    /// `Persistence` or `Concurrency` on store failure.
    fn get_slot_policy(&self, layout_id: &str, slot_name: &str) -> ExResult<Option<SlotPolicy>>;
}

/// Notified after every successful lifecycle write
///
/// Implemented by the engine's resolution cache. Implementations must not
/// fail the write that triggered them.
pub trait InvalidationHook: Send + Sync {
    /// A version of the page became current
    fn on_published(&self, page_id: &str);

    /// A new draft of the page was created
    fn on_draft_saved(&self, page_id: &str);
}

/// Hook that ignores every notification
///
/// # Example
/// ```
/// use canopy_core::ports::{InvalidationHook, NoopInvalidationHook};
///
/// let hook = NoopInvalidationHook;
/// hook.on_published("home");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopInvalidationHook;

impl InvalidationHook for NoopInvalidationHook {
    fn on_published(&self, _page_id: &str) {}

    fn on_draft_saved(&self, _page_id: &str) {}
}

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use crate::errors::{CanopyError, ExResult, Result};
use crate::model::{Page, PublishOutcome, SlotPolicy, Version, VersionContent, VersionStatus};
use crate::ports::{PageHierarchy, SlotPolicyRegistry, VersionStore};
use crate::traversal::{collect_ancestor_chain, ParentLink};

/// Maps held behind the store's lock
#[derive(Debug, Default)]
pub(crate) struct StoreState {
    /// Page ID to page
    pub(crate) pages: HashMap<String, Page>,
    /// Version ID to version
    pub(crate) versions: HashMap<String, Version>,
    /// Page ID to version IDs in sequence order
    pub(crate) page_versions: HashMap<String, Vec<String>>,
    /// (layout ID, slot name) to policy
    pub(crate) policies: HashMap<(String, String), SlotPolicy>,
}

impl StoreState {
    fn versions_of<'a>(&'a self, page_id: &str) -> impl Iterator<Item = &'a Version> + 'a {
        self.page_versions
            .get(page_id)
            .into_iter()
            .flatten()
            .filter_map(|id| self.versions.get(id))
    }

    fn current_version_id(&self, page_id: &str) -> Result<Option<String>> {
        let published: Vec<String> = self
            .versions_of(page_id)
            .filter(|v| v.status == VersionStatus::Published)
            .map(|v| v.id.clone())
            .collect();
        match published.len() {
            0 => Ok(None),
            1 => Ok(published.into_iter().next()),
            count => Err(CanopyError::MultipleCurrentVersions {
                page_id: page_id.to_string(),
                count,
                version_ids: published,
            }),
        }
    }

    /// Archive the current version of a page, returning it
    fn demote_current(&mut self, page_id: &str) -> Result<Option<Version>> {
        let Some(current_id) = self.current_version_id(page_id)? else {
            return Ok(None);
        };
        let current = self
            .versions
            .get_mut(&current_id)
            .ok_or_else(|| CanopyError::VersionNotFound {
                version_id: current_id.clone(),
            })?;
        current.status = VersionStatus::Archived;
        Ok(Some(current.clone()))
    }
}

/// Thread-safe in-memory store for pages, versions and slot policies
///
/// Implements all three store traits. Every write happens under a single
/// write lock, so a publish swap is never observed half-done.
#[derive(Debug, Default)]
pub struct Store {
    state: RwLock<StoreState>,
}

impl Store {
    /// Create a new empty Store
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn read_state(&self) -> Result<RwLockReadGuard<'_, StoreState>> {
        self.state.read().map_err(|_| CanopyError::LockPoisoned {
            message: "store state".to_string(),
        })
    }

    pub(crate) fn write_state(&self) -> Result<RwLockWriteGuard<'_, StoreState>> {
        self.state.write().map_err(|_| CanopyError::LockPoisoned {
            message: "store state".to_string(),
        })
    }

    /// Insert a version as-is, bypassing lifecycle checks
    ///
    /// Used by fixtures and imports. The owning page must already exist.
    ///
    /// # Errors
    ///
    /// Returns `PageNotFound` if the owning page doesn't exist.
    pub fn insert_version(&self, version: Version) -> Result<()> {
        let mut state = self.write_state()?;
        if !state.pages.contains_key(&version.page_id) {
            return Err(CanopyError::PageNotFound {
                page_id: version.page_id.clone(),
            });
        }
        let ids = state.page_versions.entry(version.page_id.clone()).or_default();
        if !ids.contains(&version.id) {
            ids.push(version.id.clone());
        }
        state.versions.insert(version.id.clone(), version);
        Ok(())
    }

    /// Number of pages stored
    pub fn page_count(&self) -> usize {
        self.read_state().map(|s| s.pages.len()).unwrap_or(0)
    }
}

impl PageHierarchy for Store {
    fn get_page(&self, page_id: &str) -> ExResult<Page> {
        let state = self.read_state()?;
        state
            .pages
            .get(page_id)
            .cloned()
            .ok_or_else(|| {
                CanopyError::PageNotFound {
                    page_id: page_id.to_string(),
                }
                .into()
            })
    }

    fn get_parent(&self, page_id: &str) -> ExResult<Option<String>> {
        Ok(self.get_page(page_id)?.parent_id)
    }

    fn get_ancestor_chain(&self, page_id: &str) -> ExResult<Vec<String>> {
        let state = self.read_state()?;
        collect_ancestor_chain(page_id, |id| {
            Ok(match state.pages.get(id) {
                None => ParentLink::Missing,
                Some(page) => match &page.parent_id {
                    None => ParentLink::Root,
                    Some(parent) => ParentLink::Parent(parent.clone()),
                },
            })
        })
    }
}

impl VersionStore for Store {
    fn get_published_version(&self, page_id: &str) -> ExResult<Option<Version>> {
        let state = self.read_state()?;
        let current = state.current_version_id(page_id)?;
        Ok(current.and_then(|id| state.versions.get(&id).cloned()))
    }

    fn get_latest_draft(&self, page_id: &str) -> ExResult<Option<Version>> {
        let state = self.read_state()?;
        Ok(state
            .versions_of(page_id)
            .filter(|v| v.status == VersionStatus::Draft)
            .max_by_key(|v| v.sequence)
            .cloned())
    }

    fn get_version(&self, version_id: &str) -> ExResult<Version> {
        let state = self.read_state()?;
        state.versions.get(version_id).cloned().ok_or_else(|| {
            CanopyError::VersionNotFound {
                version_id: version_id.to_string(),
            }
            .into()
        })
    }

    fn list_versions(&self, page_id: &str) -> ExResult<Vec<Version>> {
        let state = self.read_state()?;
        let mut versions: Vec<Version> = state.versions_of(page_id).cloned().collect();
        versions.sort_by_key(|v| v.sequence);
        Ok(versions)
    }

    fn put_version(
        &self,
        page_id: &str,
        content: VersionContent,
        status: VersionStatus,
        restored_from: Option<&str>,
    ) -> ExResult<Version> {
        if status == VersionStatus::Archived {
            return Err(CanopyError::InvalidInitialStatus {
                page_id: page_id.to_string(),
                status,
            }
            .into());
        }

        let mut state = self.write_state()?;
        if !state.pages.contains_key(page_id) {
            return Err(CanopyError::PageNotFound {
                page_id: page_id.to_string(),
            }
            .into());
        }

        let sequence = state
            .versions_of(page_id)
            .map(|v| v.sequence)
            .max()
            .unwrap_or(0)
            + 1;
        let now = Utc::now();

        if status == VersionStatus::Published {
            state.demote_current(page_id)?;
        }

        let version = Version {
            id: Uuid::now_v7().to_string(),
            page_id: page_id.to_string(),
            sequence,
            status,
            created_at: now,
            published_at: (status == VersionStatus::Published).then_some(now),
            description: content.description,
            restored_from: restored_from.map(str::to_string),
            slots: content.slots,
        };

        state
            .page_versions
            .entry(page_id.to_string())
            .or_default()
            .push(version.id.clone());
        state.versions.insert(version.id.clone(), version.clone());

        Ok(version)
    }

    fn promote(&self, version_id: &str, at: DateTime<Utc>) -> ExResult<PublishOutcome> {
        let mut state = self.write_state()?;

        let (page_id, status) = match state.versions.get(version_id) {
            Some(v) => (v.page_id.clone(), v.status),
            None => {
                return Err(CanopyError::VersionNotFound {
                    version_id: version_id.to_string(),
                }
                .into())
            }
        };
        if !status.can_publish() {
            return Err(CanopyError::InvalidTransition {
                version_id: version_id.to_string(),
                status,
                action: "publish".to_string(),
            }
            .into());
        }

        let archived = state.demote_current(&page_id)?;

        let published = state
            .versions
            .get_mut(version_id)
            .ok_or_else(|| CanopyError::VersionNotFound {
                version_id: version_id.to_string(),
            })?;
        published.status = VersionStatus::Published;
        published.published_at = Some(at);

        Ok(PublishOutcome {
            published: published.clone(),
            archived,
        })
    }
}

impl SlotPolicyRegistry for Store {
    fn get_slot_policy(&self, layout_id: &str, slot_name: &str) -> ExResult<Option<SlotPolicy>> {
        let state = self.read_state()?;
        Ok(state
            .policies
            .get(&(layout_id.to_string(), slot_name.to_string()))
            .copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ExErrorKind;
    use crate::ops::create_page;

    fn store_with_page() -> Store {
        let store = Store::new();
        create_page(&store, Page::new("home", "Home", "default")).unwrap();
        store
    }

    #[test]
    fn test_put_version_assigns_increasing_sequence() {
        let store = store_with_page();
        let v1 = store
            .put_version("home", VersionContent::new(), VersionStatus::Draft, None)
            .unwrap();
        let v2 = store
            .put_version("home", VersionContent::new(), VersionStatus::Draft, None)
            .unwrap();

        assert_eq!(v1.sequence, 1);
        assert_eq!(v2.sequence, 2);
        assert_ne!(v1.id, v2.id);
    }

    #[test]
    fn test_put_version_rejects_archived() {
        let store = store_with_page();
        let err = store
            .put_version("home", VersionContent::new(), VersionStatus::Archived, None)
            .unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidTransition);
    }

    #[test]
    fn test_put_version_unknown_page() {
        let store = Store::new();
        let err = store
            .put_version("ghost", VersionContent::new(), VersionStatus::Draft, None)
            .unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::NotFound);
    }

    #[test]
    fn test_promote_archives_previous_current() {
        let store = store_with_page();
        let v1 = store
            .put_version("home", VersionContent::new(), VersionStatus::Draft, None)
            .unwrap();
        let v2 = store
            .put_version("home", VersionContent::new(), VersionStatus::Draft, None)
            .unwrap();

        store.promote(&v1.id, Utc::now()).unwrap();
        let outcome = store.promote(&v2.id, Utc::now()).unwrap();

        assert_eq!(outcome.archived.map(|v| v.id), Some(v1.id.clone()));
        assert_eq!(store.get_version(&v1.id).unwrap().status, VersionStatus::Archived);
        assert_eq!(
            store.get_published_version("home").unwrap().map(|v| v.id),
            Some(v2.id)
        );
    }

    #[test]
    fn test_promote_twice_is_invalid_transition() {
        let store = store_with_page();
        let v1 = store
            .put_version("home", VersionContent::new(), VersionStatus::Draft, None)
            .unwrap();
        store.promote(&v1.id, Utc::now()).unwrap();

        let err = store.promote(&v1.id, Utc::now()).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidTransition);
    }

    #[test]
    fn test_two_published_rows_is_inconsistent_state() {
        let store = store_with_page();
        for id in ["a", "b"] {
            store
                .insert_version(Version {
                    id: id.to_string(),
                    page_id: "home".to_string(),
                    sequence: if id == "a" { 1 } else { 2 },
                    status: VersionStatus::Published,
                    created_at: Utc::now(),
                    published_at: Some(Utc::now()),
                    description: None,
                    restored_from: None,
                    slots: Default::default(),
                })
                .unwrap();
        }

        let err = store.get_published_version("home").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InconsistentState);
    }

    #[test]
    fn test_latest_draft_picks_highest_sequence() {
        let store = store_with_page();
        store
            .put_version("home", VersionContent::new(), VersionStatus::Draft, None)
            .unwrap();
        let v2 = store
            .put_version("home", VersionContent::new(), VersionStatus::Draft, None)
            .unwrap();

        assert_eq!(store.get_latest_draft("home").unwrap().map(|v| v.id), Some(v2.id));
    }
}

use crate::errors::{CanopyError, Result};
use crate::model::{Page, SlotPolicy};

use super::store::Store;

/// Add a page to the tree
///
/// The parent (if any) must already exist; the new page is appended to
/// the parent's children. Checks and insert happen under one write lock.
///
/// # Errors
/// * `EmptyPageId` - Page id is empty
/// * `PageAlreadyExists` - Page id is taken
/// * `ParentNotFound` - Parent page doesn't exist
pub fn create_page(store: &Store, page: Page) -> Result<Page> {
    if page.id.trim().is_empty() {
        return Err(CanopyError::EmptyPageId);
    }

    let mut state = store.write_state()?;
    if state.pages.contains_key(&page.id) {
        return Err(CanopyError::PageAlreadyExists {
            page_id: page.id.clone(),
        });
    }

    if let Some(parent_id) = &page.parent_id {
        let parent = state
            .pages
            .get_mut(parent_id)
            .ok_or_else(|| CanopyError::ParentNotFound {
                page_id: parent_id.clone(),
            })?;
        parent.add_child(page.id.clone());
    }

    state.pages.insert(page.id.clone(), page.clone());
    Ok(page)
}

/// Register (or replace) the policy for a layout's slot
///
/// # Errors
/// * `EmptySlotName` - Slot name is empty
pub fn set_slot_policy(
    store: &Store,
    layout_id: &str,
    slot_name: &str,
    policy: SlotPolicy,
) -> Result<()> {
    if slot_name.trim().is_empty() {
        return Err(CanopyError::EmptySlotName);
    }
    let mut state = store.write_state()?;
    state
        .policies
        .insert((layout_id.to_string(), slot_name.to_string()), policy);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::PageHierarchy;

    #[test]
    fn test_create_child_links_parent() {
        let store = Store::new();
        create_page(&store, Page::new("root", "Root", "default")).unwrap();
        create_page(&store, Page::new("about", "About", "default").with_parent("root")).unwrap();

        let root = store.get_page("root").unwrap();
        assert_eq!(root.children, vec!["about".to_string()]);
        assert_eq!(store.get_parent("about").unwrap(), Some("root".to_string()));
    }

    #[test]
    fn test_duplicate_page_rejected() {
        let store = Store::new();
        create_page(&store, Page::new("root", "Root", "default")).unwrap();
        let err = create_page(&store, Page::new("root", "Again", "default")).unwrap_err();
        assert!(matches!(err, CanopyError::PageAlreadyExists { .. }));
    }

    #[test]
    fn test_missing_parent_rejected() {
        let store = Store::new();
        let err =
            create_page(&store, Page::new("orphan", "Orphan", "default").with_parent("nowhere"))
                .unwrap_err();
        assert!(matches!(err, CanopyError::ParentNotFound { .. }));
        assert_eq!(store.page_count(), 0);
    }
}

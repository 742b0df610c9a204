use canopy_core::ops::{create_page, set_slot_policy};
use canopy_core::{
    Page, SlotPolicy, Store, Version, VersionContent, VersionStatus, VersionStore, WidgetRecord,
};
use chrono::{DateTime, TimeZone, Utc};

pub const LAYOUT: &str = "default";

/// Create a new empty Store for testing
#[allow(dead_code)]
pub fn new_store() -> Store {
    Store::new()
}

/// Add a page with the default layout under `parent`
#[allow(dead_code)]
pub fn add_page(store: &Store, id: &str, parent: Option<&str>) -> Page {
    let mut page = Page::new(id, id.to_uppercase(), LAYOUT);
    if let Some(parent) = parent {
        page = page.with_parent(parent);
    }
    create_page(store, page).unwrap()
}

/// Build a linear chain root -> ... -> leaf and return the ids in order
#[allow(dead_code)]
pub fn add_chain(store: &Store, ids: &[&str]) -> Vec<String> {
    let mut parent: Option<&str> = None;
    for id in ids {
        add_page(store, id, parent);
        parent = Some(id);
    }
    ids.iter().map(|s| s.to_string()).collect()
}

/// Register a slot policy for the default layout
#[allow(dead_code)]
pub fn set_policy(store: &Store, slot: &str, policy: SlotPolicy) {
    set_slot_policy(store, LAYOUT, slot, policy).unwrap();
}

/// Append a published version holding `widgets` in `slot`
///
/// Bypasses the lifecycle manager; use it for fixture setup only.
#[allow(dead_code)]
pub fn publish_slot(store: &Store, page_id: &str, slot: &str, widgets: Vec<WidgetRecord>) -> Version {
    let draft = store
        .put_version(
            page_id,
            VersionContent::new().with_slot(slot, widgets),
            VersionStatus::Draft,
            None,
        )
        .unwrap();
    store.promote(&draft.id, Utc::now()).unwrap().published
}

/// Append a draft holding `widgets` in `slot`
#[allow(dead_code)]
pub fn draft_slot(store: &Store, page_id: &str, slot: &str, widgets: Vec<WidgetRecord>) -> Version {
    store
        .put_version(
            page_id,
            VersionContent::new().with_slot(slot, widgets),
            VersionStatus::Draft,
            None,
        )
        .unwrap()
}

/// Published, window-less widget inherited at every depth
#[allow(dead_code)]
pub fn inheritable(id: &str, sort_order: i64) -> WidgetRecord {
    WidgetRecord::new(id, "text")
        .with_inheritance_level(-1)
        .with_sort_order(sort_order)
}

/// Published, window-less widget shown only on its own page
#[allow(dead_code)]
pub fn local(id: &str, sort_order: i64) -> WidgetRecord {
    WidgetRecord::new(id, "text").with_sort_order(sort_order)
}

/// Fixed instant for deterministic window tests
#[allow(dead_code)]
pub fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, hour, 0, 0).unwrap()
}

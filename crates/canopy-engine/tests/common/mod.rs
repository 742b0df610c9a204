#![allow(dead_code)]

use canopy_core::ops::{create_page, set_slot_policy};
use canopy_core::{CanopyConfig, Page, SlotPolicy, Store, VersionContent, WidgetRecord};
use canopy_engine::Engine;
use chrono::{DateTime, TimeZone, Utc};
use std::sync::Arc;

pub const LAYOUT: &str = "default";

/// root -> section -> leaf, with a replace-mode `header` slot
pub fn engine_with_tree(config: CanopyConfig) -> (Engine, Arc<Store>) {
    let store = Arc::new(Store::new());
    create_page(&store, Page::new("root", "Root", LAYOUT)).unwrap();
    create_page(&store, Page::new("section", "Section", LAYOUT).with_parent("root")).unwrap();
    create_page(&store, Page::new("leaf", "Leaf", LAYOUT).with_parent("section")).unwrap();
    set_slot_policy(&store, LAYOUT, "header", SlotPolicy::replace()).unwrap();
    (Engine::from_store(store.clone(), config), store)
}

pub fn header(widgets: Vec<WidgetRecord>) -> VersionContent {
    VersionContent::new().with_slot("header", widgets)
}

pub fn nav(id: &str) -> WidgetRecord {
    WidgetRecord::new(id, "navigation").with_inheritance_level(-1)
}

/// Save and publish header content on a page through the engine
pub fn publish_header(engine: &Engine, page_id: &str, widgets: Vec<WidgetRecord>) -> String {
    let draft = engine.save_draft(page_id, header(widgets)).unwrap();
    engine.publish(&draft.id).unwrap();
    draft.id
}

pub fn noon() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use canopy_core::errors::ExErrorKind;
use canopy_core::{resolve_slot, SlotPolicy, SlotRequest, Store, VersionStore, WidgetRecord};
use chrono::Utc;
use common::*;

fn resolve(store: &Store, page: &str, slot: &str) -> canopy_core::ResolvedSlot {
    resolve_slot(store, store, store, &SlotRequest::live(page, slot, Utc::now())).unwrap()
}

fn navigation() -> WidgetRecord {
    WidgetRecord::new("navigation", "navigation").with_inheritance_level(-1)
}

#[test]
fn test_child_without_local_header_inherits_root_navigation() {
    let store = new_store();
    add_chain(&store, &["a", "b"]);
    set_policy(&store, "header", SlotPolicy::replace());
    let root_version = publish_slot(&store, "a", "header", vec![navigation()]);

    let resolved = resolve(&store, "b", "header");

    assert_eq!(resolved.widgets.len(), 1);
    let widget = &resolved.widgets[0];
    assert_eq!(widget.widget.id, "navigation");
    assert_eq!(widget.source_page_id, "a");
    assert_eq!(widget.source_version_id, root_version.id);
    assert_eq!(widget.depth, 1);
    assert!(widget.is_inherited);
    assert!(!widget.is_overridden);
}

#[test]
fn test_child_local_header_replaces_root_navigation() {
    let store = new_store();
    add_chain(&store, &["a", "b"]);
    set_policy(&store, "header", SlotPolicy::replace());
    publish_slot(&store, "a", "header", vec![navigation()]);
    publish_slot(&store, "b", "header", vec![local("promo", 0)]);

    let resolved = resolve(&store, "b", "header");

    assert_eq!(resolved.widget_ids(), vec!["promo"]);
    assert!(!resolved.widgets[0].is_inherited);
    assert_eq!(resolved.chain, vec!["b".to_string()]);
}

#[test]
fn test_replace_takes_first_non_empty_ancestor_level() {
    let store = new_store();
    add_chain(&store, &["root", "section", "leaf"]);
    set_policy(&store, "header", SlotPolicy::replace());
    publish_slot(&store, "root", "header", vec![inheritable("root-nav", 0)]);
    publish_slot(&store, "section", "header", vec![inheritable("section-nav", 0)]);

    let resolved = resolve(&store, "leaf", "header");

    assert_eq!(resolved.widget_ids(), vec!["section-nav"]);
    assert_eq!(resolved.chain, vec!["leaf".to_string(), "section".to_string()]);
}

#[test]
fn test_replace_skips_ancestor_levels_with_nothing_eligible() {
    let store = new_store();
    add_chain(&store, &["root", "section", "leaf"]);
    set_policy(&store, "header", SlotPolicy::replace());
    publish_slot(&store, "root", "header", vec![inheritable("root-nav", 0)]);
    // local-only on section, so it never reaches leaf
    publish_slot(&store, "section", "header", vec![local("section-only", 0)]);

    let resolved = resolve(&store, "leaf", "header");

    assert_eq!(resolved.widget_ids(), vec!["root-nav"]);
    assert_eq!(resolved.widgets[0].depth, 2);
}

#[test]
fn test_merge_appends_one_ancestor_level_after_local() {
    let store = new_store();
    add_chain(&store, &["root", "section", "leaf"]);
    set_policy(&store, "sidebar", SlotPolicy::merge());
    publish_slot(&store, "root", "sidebar", vec![inheritable("root-ad", 0)]);
    publish_slot(
        &store,
        "section",
        "sidebar",
        vec![inheritable("section-b", 2), inheritable("section-a", 1)],
    );
    publish_slot(&store, "leaf", "sidebar", vec![local("leaf-2", 5), local("leaf-1", 3)]);

    let resolved = resolve(&store, "leaf", "sidebar");

    assert_eq!(
        resolved.widget_ids(),
        vec!["leaf-1", "leaf-2", "section-a", "section-b"]
    );
}

#[test]
fn test_merge_local_override_suppresses_inherited_duplicate() {
    let store = new_store();
    add_chain(&store, &["root", "leaf"]);
    set_policy(&store, "sidebar", SlotPolicy::merge());
    publish_slot(
        &store,
        "root",
        "sidebar",
        vec![inheritable("shared", 0), inheritable("root-only", 1)],
    );
    publish_slot(&store, "leaf", "sidebar", vec![local("shared", 0)]);

    let resolved = resolve(&store, "leaf", "sidebar");

    assert_eq!(resolved.widget_ids(), vec!["shared", "root-only"]);
    assert_eq!(resolved.widgets[0].source_page_id, "leaf");
    assert!(resolved.widgets[0].is_overridden);
    assert!(!resolved.widgets[1].is_overridden);
}

#[test]
fn test_slot_without_inheritance_ignores_ancestors() {
    let store = new_store();
    add_chain(&store, &["root", "leaf"]);
    set_policy(&store, "main", SlotPolicy::local_only());
    publish_slot(&store, "root", "main", vec![inheritable("hero", 0)]);

    let resolved = resolve(&store, "leaf", "main");

    assert!(resolved.is_empty());
    assert_eq!(resolved.chain, vec!["leaf".to_string()]);
}

#[test]
fn test_missing_policy_falls_back_to_local_only() {
    let store = new_store();
    add_chain(&store, &["root", "leaf"]);
    publish_slot(&store, "root", "footer", vec![inheritable("copyright", 0)]);
    publish_slot(&store, "leaf", "footer", vec![local("contact", 0)]);

    let resolved = resolve(&store, "leaf", "footer");

    assert_eq!(resolved.widget_ids(), vec!["contact"]);
    assert_eq!(resolved.policy, SlotPolicy::local_only());
}

#[test]
fn test_root_target_walks_only_itself() {
    let store = new_store();
    add_page(&store, "root", None);
    set_policy(&store, "header", SlotPolicy::merge());
    publish_slot(&store, "root", "header", vec![local("logo", 0)]);

    let resolved = resolve(&store, "root", "header");

    assert_eq!(resolved.widget_ids(), vec!["logo"]);
    assert_eq!(resolved.chain.len(), 1);
}

#[test]
fn test_ancestor_without_version_contributes_nothing() {
    let store = new_store();
    add_chain(&store, &["root", "section", "leaf"]);
    set_policy(&store, "header", SlotPolicy::replace());
    publish_slot(&store, "root", "header", vec![inheritable("nav", 0)]);

    let resolved = resolve(&store, "leaf", "header");

    assert_eq!(resolved.widget_ids(), vec!["nav"]);
    assert_eq!(resolved.widgets[0].depth, 2);
}

#[test]
fn test_bounded_inheritance_level() {
    let store = new_store();
    add_chain(&store, &["root", "one", "two", "three"]);
    set_policy(&store, "header", SlotPolicy::replace());
    publish_slot(
        &store,
        "root",
        "header",
        vec![WidgetRecord::new("nav", "navigation").with_inheritance_level(2)],
    );

    assert_eq!(resolve(&store, "two", "header").widget_ids(), vec!["nav"]);
    assert!(resolve(&store, "three", "header").is_empty());
}

#[test]
fn test_unknown_target_page_is_not_found() {
    let store = new_store();
    let err = resolve_slot(
        &store,
        &store,
        &store,
        &SlotRequest::live("ghost", "header", Utc::now()),
    )
    .unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::NotFound);
    assert_eq!(err.op(), Some("resolve_slot"));
}

#[test]
fn test_preview_reads_latest_draft_and_falls_back_to_published() {
    let store = new_store();
    add_chain(&store, &["root", "leaf"]);
    set_policy(&store, "header", SlotPolicy::replace());
    publish_slot(&store, "root", "header", vec![inheritable("live-nav", 0)]);
    draft_slot(&store, "leaf", "header", vec![local("draft-promo", 0)]);

    let live = resolve(&store, "leaf", "header");
    assert_eq!(live.widget_ids(), vec!["live-nav"]);

    let preview = resolve_slot(
        &store,
        &store,
        &store,
        &SlotRequest::preview("leaf", "header", Utc::now()),
    )
    .unwrap();
    assert_eq!(preview.widget_ids(), vec!["draft-promo"]);

    // root has no draft, so preview of root falls back to its published version
    let root_preview = resolve_slot(
        &store,
        &store,
        &store,
        &SlotRequest::preview("root", "header", Utc::now()),
    )
    .unwrap();
    assert_eq!(root_preview.widget_ids(), vec!["live-nav"]);
}

#[test]
fn test_preview_skips_drafts_older_than_published() {
    let store = new_store();
    add_page(&store, "home", None);
    draft_slot(&store, "home", "banner", vec![local("old-draft", 0)]);
    let newer = draft_slot(&store, "home", "banner", vec![local("new-content", 0)]);
    store.promote(&newer.id, Utc::now()).unwrap();

    let live = resolve(&store, "home", "banner");
    let preview = resolve_slot(
        &store,
        &store,
        &store,
        &SlotRequest::preview("home", "banner", Utc::now()),
    )
    .unwrap();

    assert_eq!(live.widget_ids(), vec!["new-content"]);
    assert_eq!(preview.widget_ids(), vec!["new-content"]);

    // A draft saved after the publish is previewed again
    draft_slot(&store, "home", "banner", vec![local("next-draft", 0)]);
    let preview = resolve_slot(
        &store,
        &store,
        &store,
        &SlotRequest::preview("home", "banner", Utc::now()),
    )
    .unwrap();
    assert_eq!(preview.widget_ids(), vec!["next-draft"]);
}

#[test]
fn test_visibility_window_boundaries_are_inclusive() {
    let store = new_store();
    add_page(&store, "home", None);
    publish_slot(
        &store,
        "home",
        "banner",
        vec![local("sale", 0).with_window(Some(at(9)), Some(at(17)))],
    );

    let resolve_at = |hour: u32, minute_offset: i64| {
        let as_of = at(hour) + chrono::Duration::seconds(minute_offset);
        resolve_slot(&store, &store, &store, &SlotRequest::live("home", "banner", as_of))
            .unwrap()
            .widget_ids()
            .len()
    };

    assert_eq!(resolve_at(9, -1), 0);
    assert_eq!(resolve_at(9, 0), 1);
    assert_eq!(resolve_at(12, 0), 1);
    assert_eq!(resolve_at(17, 0), 1);
    assert_eq!(resolve_at(17, 1), 0);
}

#[test]
fn test_unpublished_widget_is_filtered() {
    let store = new_store();
    add_page(&store, "home", None);
    publish_slot(
        &store,
        "home",
        "header",
        vec![local("hidden", 0).with_published(false), local("shown", 1)],
    );

    assert_eq!(resolve(&store, "home", "header").widget_ids(), vec!["shown"]);
}

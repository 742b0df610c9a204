#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use canopy_core::errors::ExErrorKind;
use canopy_core::{CanopyConfig, RestoreMode, SlotRequest, VersionStatus, VersionStore};
use canopy_core_types::{RequestContext, RequestId};
use canopy_engine::{apply_engine_command, Engine, EngineCommand, EngineCommandResult};
use chrono::Duration;
use common::*;
use std::sync::Arc;
use std::thread;

#[test]
fn test_repeated_resolution_is_served_from_cache() {
    let (engine, _store) = engine_with_tree(CanopyConfig::default());
    publish_header(&engine, "root", vec![nav("main-nav")]);

    let request = SlotRequest::live("leaf", "header", noon());
    let first = engine.resolve_slot(&request).unwrap();
    let misses = engine.cache().stats().misses;
    let second = engine
        .resolve_slot(&SlotRequest::live("leaf", "header", noon() + Duration::seconds(30)))
        .unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(engine.cache().stats().misses, misses);
    assert_eq!(first.widget_ids(), vec!["main-nav"]);
}

#[test]
fn test_ancestor_publish_invalidates_descendant_entry() {
    let (engine, _store) = engine_with_tree(CanopyConfig::default());
    publish_header(&engine, "root", vec![nav("main-nav")]);

    let request = SlotRequest::live("leaf", "header", noon());
    assert_eq!(engine.resolve_slot(&request).unwrap().widget_ids(), vec!["main-nav"]);

    publish_header(&engine, "root", vec![nav("new-nav")]);

    assert_eq!(engine.resolve_slot(&request).unwrap().widget_ids(), vec!["new-nav"]);
}

#[test]
fn test_draft_save_refreshes_preview_but_not_live() {
    let (engine, _store) = engine_with_tree(CanopyConfig::default());
    publish_header(&engine, "root", vec![nav("main-nav")]);

    let live = SlotRequest::live("leaf", "header", noon());
    let preview = SlotRequest::preview("leaf", "header", noon());
    engine.resolve_slot(&live).unwrap();
    engine.resolve_slot(&preview).unwrap();

    engine.save_draft("root", header(vec![nav("draft-nav")])).unwrap();

    assert_eq!(engine.resolve_slot(&live).unwrap().widget_ids(), vec!["main-nav"]);
    assert_eq!(engine.resolve_slot(&preview).unwrap().widget_ids(), vec!["draft-nav"]);
}

#[test]
fn test_preview_after_publish_ignores_older_sibling_draft() {
    let (engine, _store) = engine_with_tree(CanopyConfig::default());
    engine.save_draft("root", header(vec![nav("old-draft")])).unwrap();
    publish_header(&engine, "root", vec![nav("new-content")]);

    let live = engine.resolve_slot(&SlotRequest::live("leaf", "header", noon())).unwrap();
    let preview = engine
        .resolve_slot(&SlotRequest::preview("leaf", "header", noon()))
        .unwrap();

    assert_eq!(live.widget_ids(), vec!["new-content"]);
    assert_eq!(preview.widget_ids(), vec!["new-content"]);
}

#[test]
fn test_cached_result_is_computed_at_bucket_floor() {
    let (engine, _store) = engine_with_tree(CanopyConfig::default());
    let resolved = engine
        .resolve_slot(&SlotRequest::live("leaf", "header", noon() + Duration::seconds(42)))
        .unwrap();
    assert_eq!(resolved.as_of, noon());
}

#[test]
fn test_unknown_page_is_not_found() {
    let (engine, _store) = engine_with_tree(CanopyConfig::default());
    let err = engine
        .resolve_slot(&SlotRequest::live("ghost", "header", noon()))
        .unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::NotFound);
}

#[test]
fn test_restore_uses_configured_mode() {
    let mut config = CanopyConfig::default();
    config.lifecycle.restore_mode = RestoreMode::Publish;
    let (engine, store) = engine_with_tree(config);

    let old = publish_header(&engine, "root", vec![nav("old-nav")]);
    publish_header(&engine, "root", vec![nav("new-nav")]);
    let request = SlotRequest::live("leaf", "header", noon());
    assert_eq!(engine.resolve_slot(&request).unwrap().widget_ids(), vec!["new-nav"]);

    let restored = engine.restore("root", &old).unwrap();

    assert_eq!(restored.status, VersionStatus::Published);
    assert_eq!(store.get_version(&old).unwrap().status, VersionStatus::Archived);
    assert_eq!(engine.resolve_slot(&request).unwrap().widget_ids(), vec!["old-nav"]);
}

#[test]
fn test_compare_through_engine() {
    let (engine, _store) = engine_with_tree(CanopyConfig::default());
    let a = publish_header(&engine, "root", vec![nav("main-nav")]);
    let b = publish_header(&engine, "root", vec![nav("main-nav"), nav("extra")]);

    assert!(engine.compare(&a, &a).unwrap().is_empty());
    assert!(!engine.compare(&a, &b).unwrap().is_empty());
}

#[test]
fn test_concurrent_publishes_leave_one_current_version() {
    let (engine, store) = engine_with_tree(CanopyConfig::default());
    let engine = Arc::new(engine);
    let drafts: Vec<String> = (0..8)
        .map(|i| {
            engine
                .save_draft("root", header(vec![nav(&format!("nav-{i}"))]))
                .unwrap()
                .id
        })
        .collect();

    let handles: Vec<_> = drafts
        .into_iter()
        .map(|id| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || engine.publish(&id).unwrap())
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let published: Vec<_> = store
        .list_versions("root")
        .unwrap()
        .into_iter()
        .filter(|v| v.status == VersionStatus::Published)
        .collect();
    assert_eq!(published.len(), 1);

    let resolved = engine
        .resolve_slot(&SlotRequest::live("leaf", "header", noon()))
        .unwrap();
    assert_eq!(resolved.widgets[0].source_version_id, published[0].id);
}

#[test]
fn test_apply_engine_command_save_then_publish() {
    let (engine, _store) = engine_with_tree(CanopyConfig::default());
    let ctx = RequestContext::new();

    let draft = match apply_engine_command(
        &engine,
        EngineCommand::SaveDraft {
            page_id: "section".to_string(),
            content: header(vec![nav("section-nav")]),
        },
        &ctx,
    )
    .unwrap()
    {
        EngineCommandResult::SaveDraft(v) => v,
        other => panic!("unexpected result: {other:?}"),
    };

    let outcome = apply_engine_command(
        &engine,
        EngineCommand::Publish {
            version_id: draft.id.clone(),
            at: Some(noon()),
        },
        &ctx,
    )
    .unwrap();

    match outcome {
        EngineCommandResult::Publish(outcome) => {
            assert_eq!(outcome.published.id, draft.id);
            assert_eq!(outcome.published.published_at, Some(noon()));
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn test_command_error_carries_request_id() {
    let (engine, _store) = engine_with_tree(CanopyConfig::default());
    let request_id = RequestId::from("req-publish-1");
    let ctx = RequestContext::with_request_id(request_id.clone());

    let err = apply_engine_command(
        &engine,
        EngineCommand::Publish {
            version_id: "missing".to_string(),
            at: None,
        },
        &ctx,
    )
    .unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::NotFound);
    assert_eq!(err.request_id(), Some(&request_id));
}

#[test]
fn test_command_decodes_from_json() {
    let cmd: EngineCommand = serde_json::from_str(
        r#"{"command": "restore", "page_id": "root", "version_id": "v1", "mode": "publish"}"#,
    )
    .unwrap();

    assert_eq!(
        cmd,
        EngineCommand::Restore {
            page_id: "root".to_string(),
            version_id: "v1".to_string(),
            mode: Some(RestoreMode::Publish),
        }
    );
}

#[test]
fn test_sqlite_backed_engine() {
    let dir = tempfile::tempdir().unwrap();
    let (engine, store) =
        Engine::open_sqlite(&dir.path().join("canopy.db"), CanopyConfig::default()).unwrap();
    store
        .create_page(canopy_core::Page::new("root", "Root", LAYOUT))
        .unwrap();
    store
        .create_page(canopy_core::Page::new("leaf", "Leaf", LAYOUT).with_parent("root"))
        .unwrap();
    store
        .set_slot_policy(LAYOUT, "header", canopy_core::SlotPolicy::replace())
        .unwrap();

    publish_header(&engine, "root", vec![nav("main-nav")]);

    let resolved = engine
        .resolve_slot(&SlotRequest::live("leaf", "header", noon()))
        .unwrap();
    assert_eq!(resolved.widget_ids(), vec!["main-nav"]);
    assert_eq!(resolved.widgets[0].depth, 1);
}

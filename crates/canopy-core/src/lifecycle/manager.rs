//! Lifecycle write operations
//!
//! Every operation logs its boundaries, surfaces typed errors, and notifies
//! the invalidation hook after a successful write.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::time::Instant;

use crate::diff::{compute_version_diff, VersionDiff};
use crate::errors::{CanopyError, ExError, ExResult};
use crate::model::{PublishOutcome, Version, VersionContent, VersionStatus};
use crate::ports::{InvalidationHook, PageHierarchy, SlotPolicyRegistry, VersionStore};
use crate::rules::validate_content;
use crate::{log_op_end, log_op_error, log_op_start};

use super::RestoreMode;

/// Create a new draft for a page
///
/// Copies the content of `base_version_id` when given, otherwise the draft
/// starts with no widgets.
///
/// # Errors
/// * `NotFound` - Page or base version doesn't exist
/// * `InvalidInput` - Base version belongs to another page
pub fn create_draft(
    hierarchy: &dyn PageHierarchy,
    versions: &dyn VersionStore,
    hook: &dyn InvalidationHook,
    page_id: &str,
    base_version_id: Option<&str>,
) -> ExResult<Version> {
    log_op_start!("create_draft", page_id = page_id, base_version_id = ?base_version_id);
    let start = Instant::now();

    let draft = create_draft_impl(hierarchy, versions, page_id, base_version_id).map_err(|e| {
        log_op_error!(
            "create_draft",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;
    hook.on_draft_saved(page_id);

    log_op_end!(
        "create_draft",
        duration_ms = start.elapsed().as_millis() as u64,
        version_id = %draft.id,
        sequence = draft.sequence
    );
    Ok(draft)
}

fn create_draft_impl(
    hierarchy: &dyn PageHierarchy,
    versions: &dyn VersionStore,
    page_id: &str,
    base_version_id: Option<&str>,
) -> ExResult<Version> {
    hierarchy.get_page(page_id)?;

    let content = match base_version_id {
        Some(base_id) => {
            let base = versions.get_version(base_id)?;
            ensure_same_page(&base, page_id)?;
            base.content()
        }
        None => VersionContent::new(),
    };

    versions.put_version(page_id, content, VersionStatus::Draft, None)
}

/// Validate editor content and append it as a new draft
///
/// # Errors
/// * `NotFound` - Page doesn't exist
/// * `InvalidInput` - Empty names, duplicate widget ids, bad levels or windows
/// * `CapacityExceeded` - A slot holds more widgets than its policy allows
pub fn save_draft(
    hierarchy: &dyn PageHierarchy,
    versions: &dyn VersionStore,
    policies: &dyn SlotPolicyRegistry,
    hook: &dyn InvalidationHook,
    page_id: &str,
    content: VersionContent,
) -> ExResult<Version> {
    log_op_start!(
        "save_draft",
        page_id = page_id,
        widget_count = content.widget_count()
    );
    let start = Instant::now();

    let draft = save_draft_impl(hierarchy, versions, policies, page_id, content).map_err(|e| {
        log_op_error!(
            "save_draft",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;
    hook.on_draft_saved(page_id);

    log_op_end!(
        "save_draft",
        duration_ms = start.elapsed().as_millis() as u64,
        version_id = %draft.id,
        sequence = draft.sequence
    );
    Ok(draft)
}

fn save_draft_impl(
    hierarchy: &dyn PageHierarchy,
    versions: &dyn VersionStore,
    policies: &dyn SlotPolicyRegistry,
    page_id: &str,
    content: VersionContent,
) -> ExResult<Version> {
    let page = hierarchy.get_page(page_id)?;

    let mut limits: BTreeMap<String, usize> = BTreeMap::new();
    for slot_name in content.slots.keys() {
        if let Some(max) = policies
            .get_slot_policy(&page.layout_id, slot_name)?
            .and_then(|p| p.max_widgets)
        {
            limits.insert(slot_name.clone(), max);
        }
    }

    validate_content(&content, |slot| limits.get(slot).copied())
        .map_err(|e| ExError::from(e).with_op("save_draft").with_page_id(page_id))?;

    versions.put_version(page_id, content, VersionStatus::Draft, None)
}

/// Publish a draft
///
/// The page's current version (if any) is archived and the draft becomes
/// current in one atomic store operation. Of two concurrent publishes of
/// the same draft exactly one succeeds.
///
/// # Errors
/// * `NotFound` - Version doesn't exist
/// * `InvalidTransition` - Version is not a draft
pub fn publish(
    versions: &dyn VersionStore,
    hook: &dyn InvalidationHook,
    version_id: &str,
    at: DateTime<Utc>,
) -> ExResult<PublishOutcome> {
    log_op_start!("publish", version_id = version_id);
    let start = Instant::now();

    let outcome = publish_impl(versions, version_id, at).map_err(|e| {
        log_op_error!(
            "publish",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;
    hook.on_published(&outcome.published.page_id);

    log_op_end!(
        "publish",
        duration_ms = start.elapsed().as_millis() as u64,
        page_id = %outcome.published.page_id,
        archived_version_id = ?outcome.archived.as_ref().map(|v| v.id.as_str())
    );
    Ok(outcome)
}

fn publish_impl(
    versions: &dyn VersionStore,
    version_id: &str,
    at: DateTime<Utc>,
) -> ExResult<PublishOutcome> {
    let version = versions.get_version(version_id)?;
    if !version.status.can_publish() {
        return Err(CanopyError::InvalidTransition {
            version_id: version_id.to_string(),
            status: version.status,
            action: "publish".to_string(),
        }
        .into());
    }

    // The store re-checks the status inside its critical section
    versions.promote(version_id, at)
}

/// Restore historical content as a new version
///
/// The new version deep-copies the historical content and records where it
/// came from. Depending on `mode` it is a draft or immediately current.
/// The historical version is never modified.
///
/// # Errors
/// * `NotFound` - Page or historical version doesn't exist
/// * `InvalidInput` - Historical version belongs to another page
pub fn restore(
    hierarchy: &dyn PageHierarchy,
    versions: &dyn VersionStore,
    hook: &dyn InvalidationHook,
    page_id: &str,
    historical_version_id: &str,
    mode: RestoreMode,
) -> ExResult<Version> {
    log_op_start!(
        "restore",
        page_id = page_id,
        historical_version_id = historical_version_id,
        restore_mode = ?mode
    );
    let start = Instant::now();

    let restored = restore_impl(hierarchy, versions, page_id, historical_version_id, mode)
        .map_err(|e| {
            log_op_error!(
                "restore",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;
    match restored.status {
        VersionStatus::Published => hook.on_published(page_id),
        _ => hook.on_draft_saved(page_id),
    }

    log_op_end!(
        "restore",
        duration_ms = start.elapsed().as_millis() as u64,
        version_id = %restored.id,
        status = %restored.status
    );
    Ok(restored)
}

fn restore_impl(
    hierarchy: &dyn PageHierarchy,
    versions: &dyn VersionStore,
    page_id: &str,
    historical_version_id: &str,
    mode: RestoreMode,
) -> ExResult<Version> {
    hierarchy.get_page(page_id)?;

    let historical = versions.get_version(historical_version_id)?;
    ensure_same_page(&historical, page_id)?;

    let status = match mode {
        RestoreMode::Draft => VersionStatus::Draft,
        RestoreMode::Publish => VersionStatus::Published,
    };
    versions.put_version(page_id, historical.content(), status, Some(&historical.id))
}

/// Compare two stored versions
///
/// # Errors
/// * `NotFound` - Either version doesn't exist
/// * `DeterminismViolation` - The diff failed its round-trip check
pub fn compare(
    versions: &dyn VersionStore,
    version_a_id: &str,
    version_b_id: &str,
) -> ExResult<VersionDiff> {
    let a = versions.get_version(version_a_id)?;
    let b = versions.get_version(version_b_id)?;
    compute_version_diff(&a, &b)
}

fn ensure_same_page(version: &Version, page_id: &str) -> ExResult<()> {
    if version.page_id != page_id {
        return Err(CanopyError::VersionPageMismatch {
            version_id: version.id.clone(),
            page_id: page_id.to_string(),
            owner_page_id: version.page_id.clone(),
        }
        .into());
    }
    Ok(())
}

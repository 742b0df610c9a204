//! Version diff computation engine.
//!
//! The entry point is [`compute_version_diff`], which compares two versions
//! field by field and widget by widget.

use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

use crate::diff::model::{
    DiffClassification, DiffIdentity, DiffSeverity, FieldChange, SlotChanges, SlotWidgetChanges,
    VersionDiff, WidgetChange,
};
use crate::digest::version_digest;
use crate::errors::{ExError, ExErrorKind, ExResult};
use crate::model::{Version, WidgetRecord};

/// Compute a set-delta between two ordered lists.
///
/// Returns `(added, removed)` where added = in b but not a, removed = in a but not b.
fn set_delta(a: &[String], b: &[String]) -> (Vec<String>, Vec<String>) {
    let set_a: BTreeSet<&str> = a.iter().map(|s| s.as_str()).collect();
    let set_b: BTreeSet<&str> = b.iter().map(|s| s.as_str()).collect();
    let added: Vec<String> = b
        .iter()
        .filter(|s| !set_a.contains(s.as_str()))
        .cloned()
        .collect();
    let removed: Vec<String> = a
        .iter()
        .filter(|s| !set_b.contains(s.as_str()))
        .cloned()
        .collect();
    (added, removed)
}

/// Version-level fields that count as changes; sequence and timestamps never do.
fn field_changes(a: &Version, b: &Version) -> BTreeMap<String, FieldChange> {
    let fields: [(&str, Value, Value); 4] = [
        (
            "page_id",
            Value::String(a.page_id.clone()),
            Value::String(b.page_id.clone()),
        ),
        (
            "status",
            Value::String(a.status.as_str().to_string()),
            Value::String(b.status.as_str().to_string()),
        ),
        (
            "description",
            a.description.clone().map(Value::String).unwrap_or(Value::Null),
            b.description.clone().map(Value::String).unwrap_or(Value::Null),
        ),
        (
            "restored_from",
            a.restored_from.clone().map(Value::String).unwrap_or(Value::Null),
            b.restored_from.clone().map(Value::String).unwrap_or(Value::Null),
        ),
    ];

    fields
        .into_iter()
        .filter(|(_, old, new)| old != new)
        .map(|(name, old, new)| (name.to_string(), FieldChange { old, new }))
        .collect()
}

/// Widget IDs in effective display order (stable by `sort_order`).
fn display_order(widgets: &[WidgetRecord]) -> Vec<String> {
    let mut ordered: Vec<&WidgetRecord> = widgets.iter().collect();
    ordered.sort_by_key(|w| w.sort_order);
    ordered.into_iter().map(|w| w.id.clone()).collect()
}

/// Names of the attributes that differ between two records with the same id.
fn changed_widget_fields(a: &WidgetRecord, b: &WidgetRecord) -> ExResult<Vec<String>> {
    let to_object = |w: &WidgetRecord| -> ExResult<serde_json::Map<String, Value>> {
        match serde_json::to_value(w) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(ExError::new(ExErrorKind::Serialization)
                .with_op("compute_version_diff")
                .with_widget_id(w.id.as_str())
                .with_message("widget did not serialize to an object")),
            Err(e) => Err(ExError::new(ExErrorKind::Serialization)
                .with_op("compute_version_diff")
                .with_widget_id(w.id.as_str())
                .with_message(e.to_string())),
        }
    };
    let a_obj = to_object(a)?;
    let b_obj = to_object(b)?;

    let keys: BTreeSet<&String> = a_obj.keys().chain(b_obj.keys()).collect();
    Ok(keys
        .into_iter()
        .filter(|k| a_obj.get(*k) != b_obj.get(*k))
        .cloned()
        .collect())
}

fn slot_widget_changes(a: &[WidgetRecord], b: &[WidgetRecord]) -> ExResult<SlotWidgetChanges> {
    let a_order = display_order(a);
    let b_order = display_order(b);
    let (added, removed) = set_delta(&a_order, &b_order);

    let b_by_id: BTreeMap<&str, &WidgetRecord> = b.iter().map(|w| (w.id.as_str(), w)).collect();
    let mut changed = Vec::new();
    for a_widget in a {
        if let Some(b_widget) = b_by_id.get(a_widget.id.as_str()) {
            let fields = changed_widget_fields(a_widget, b_widget)?;
            if !fields.is_empty() {
                changed.push(WidgetChange {
                    widget_id: a_widget.id.clone(),
                    changed_fields: fields,
                });
            }
        }
    }
    changed.sort_by(|x, y| x.widget_id.cmp(&y.widget_id));

    let b_ids: BTreeSet<&str> = b_order.iter().map(|s| s.as_str()).collect();
    let a_ids: BTreeSet<&str> = a_order.iter().map(|s| s.as_str()).collect();
    let common_a: Vec<&String> = a_order.iter().filter(|id| b_ids.contains(id.as_str())).collect();
    let common_b: Vec<&String> = b_order.iter().filter(|id| a_ids.contains(id.as_str())).collect();

    Ok(SlotWidgetChanges {
        added,
        removed,
        changed,
        ordering_changed: common_a != common_b,
    })
}

/// Compute a structured, deterministic diff between two versions.
///
/// Identical versions produce an empty diff classified `Identical`. Versions
/// whose widget content digests match are `NoSemanticChange`; anything else
/// is `Changed` with per-slot widget detail.
///
/// # Errors
///
/// - `Serialization` - a widget could not be encoded for comparison
/// - `DeterminismViolation` - the computed diff fails its internal round-trip
///   sanity check (should never occur in correct builds)
pub fn compute_version_diff(a: &Version, b: &Version) -> ExResult<VersionDiff> {
    let identity = DiffIdentity {
        a_version_id: a.id.clone(),
        a_sequence: a.sequence,
        a_content_digest: version_digest(a),
        b_version_id: b.id.clone(),
        b_sequence: b.sequence,
        b_content_digest: version_digest(b),
    };

    // Fast-path: same version
    if a == b {
        return Ok(VersionDiff {
            diff_schema_version: 1,
            identity,
            classification: DiffClassification::Identical,
            severity: DiffSeverity::None,
            field_changes: BTreeMap::new(),
            slot_changes: SlotChanges::default(),
            widget_changes: BTreeMap::new(),
        });
    }

    let field_changes = field_changes(a, b);

    // Same widget content: only version-level fields can differ
    if identity.a_content_digest == identity.b_content_digest {
        let severity = if field_changes.is_empty() {
            DiffSeverity::None
        } else {
            DiffSeverity::Informational
        };
        return Ok(VersionDiff {
            diff_schema_version: 1,
            identity,
            classification: DiffClassification::NoSemanticChange,
            severity,
            field_changes,
            slot_changes: SlotChanges::default(),
            widget_changes: BTreeMap::new(),
        });
    }

    let a_slots: Vec<String> = a.slots.keys().cloned().collect();
    let b_slots: Vec<String> = b.slots.keys().cloned().collect();
    let (slots_added, slots_removed) = set_delta(&a_slots, &b_slots);
    let slot_changes = SlotChanges {
        added: slots_added,
        removed: slots_removed,
    };

    let all_slots: BTreeSet<&String> = a.slots.keys().chain(b.slots.keys()).collect();
    let mut widget_changes: BTreeMap<String, SlotWidgetChanges> = BTreeMap::new();
    for slot in all_slots {
        let changes = slot_widget_changes(a.widgets_in_slot(slot), b.widgets_in_slot(slot))?;
        if !changes.is_empty() {
            widget_changes.insert(slot.clone(), changes);
        }
    }

    // Severity roll-up
    let mut severities: Vec<DiffSeverity> = Vec::new();
    if !slot_changes.removed.is_empty() || widget_changes.values().any(|c| !c.removed.is_empty())
    {
        severities.push(DiffSeverity::Breaking);
    }
    if !slot_changes.added.is_empty()
        || widget_changes
            .values()
            .any(|c| !c.added.is_empty() || !c.changed.is_empty() || c.ordering_changed)
    {
        severities.push(DiffSeverity::Semantic);
    }
    if !field_changes.is_empty() {
        severities.push(DiffSeverity::Informational);
    }
    let severity = severities.into_iter().max().unwrap_or(DiffSeverity::None);

    let diff = VersionDiff {
        diff_schema_version: 1,
        identity,
        classification: DiffClassification::Changed,
        severity,
        field_changes,
        slot_changes,
        widget_changes,
    };

    // Determinism guard: round-trip through JSON must produce an equal struct
    let serialized = serde_json::to_string(&diff).map_err(|e| {
        ExError::new(ExErrorKind::DeterminismViolation)
            .with_op("compute_version_diff")
            .with_message(format!("failed to serialize diff: {}", e))
    })?;
    let reparsed: VersionDiff = serde_json::from_str(&serialized).map_err(|e| {
        ExError::new(ExErrorKind::DeterminismViolation)
            .with_op("compute_version_diff")
            .with_message(format!("failed to re-parse diff: {}", e))
    })?;
    if reparsed != diff {
        return Err(ExError::new(ExErrorKind::DeterminismViolation)
            .with_op("compute_version_diff")
            .with_message("diff is not deterministic: round-trip produced different struct"));
    }

    Ok(diff)
}

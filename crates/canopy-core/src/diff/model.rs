//! Version diff output types.
//!
//! Collections use `BTreeMap` and sorted `Vec` for deterministic serialization.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The top-level structured diff between two versions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VersionDiff {
    /// Schema version of this diff structure (always 1)
    pub diff_schema_version: u32,
    /// Which versions were compared
    pub identity: DiffIdentity,
    /// High-level classification of the diff
    pub classification: DiffClassification,
    /// Severity of the most significant change
    pub severity: DiffSeverity,
    /// Version-level fields that differ (page, status, description, restore source)
    pub field_changes: BTreeMap<String, FieldChange>,
    /// Slots present on only one side
    pub slot_changes: SlotChanges,
    /// Per-slot widget changes, only for slots that changed
    pub widget_changes: BTreeMap<String, SlotWidgetChanges>,
}

impl VersionDiff {
    /// True when nothing at all differs
    pub fn is_empty(&self) -> bool {
        self.field_changes.is_empty()
            && self.slot_changes.added.is_empty()
            && self.slot_changes.removed.is_empty()
            && self.widget_changes.is_empty()
    }
}

/// Identity of both versions being compared.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiffIdentity {
    pub a_version_id: String,
    pub a_sequence: u64,
    pub a_content_digest: String,
    pub b_version_id: String,
    pub b_sequence: u64,
    pub b_content_digest: String,
}

/// High-level classification of the diff result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum DiffClassification {
    /// Both sides are the same version
    Identical,
    /// Widget content is identical; only version-level fields differ
    NoSemanticChange,
    /// Widget content differs
    Changed,
}

/// Severity of the most significant change in the diff.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum DiffSeverity {
    /// No changes at all
    None,
    /// Version-level field changes only
    Informational,
    /// Widgets added, edited or reordered
    Semantic,
    /// Widgets or whole slots removed
    Breaking,
}

/// Old/new values for a changed field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldChange {
    pub old: serde_json::Value,
    pub new: serde_json::Value,
}

/// Slot-level set delta.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SlotChanges {
    /// Slots in B but not A
    pub added: Vec<String>,
    /// Slots in A but not B
    pub removed: Vec<String>,
}

/// Widget changes inside one slot.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SlotWidgetChanges {
    /// Widget IDs in B but not A
    pub added: Vec<String>,
    /// Widget IDs in A but not B
    pub removed: Vec<String>,
    /// Widgets present on both sides with different attributes
    pub changed: Vec<WidgetChange>,
    /// True if the widgets present on both sides are in a different order
    pub ordering_changed: bool,
}

impl SlotWidgetChanges {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
            && self.removed.is_empty()
            && self.changed.is_empty()
            && !self.ordering_changed
    }
}

/// One widget whose attributes differ between A and B.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WidgetChange {
    pub widget_id: String,
    /// Names of the attributes that differ, sorted
    pub changed_fields: Vec<String>,
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::widget::WidgetRecord;

/// Lifecycle status of a version
///
/// `Draft -> Published -> Archived`. Archived is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionStatus {
    Draft,
    Published,
    Archived,
}

impl VersionStatus {
    /// Stable lowercase name, also used as the persisted form
    pub fn as_str(&self) -> &'static str {
        match self {
            VersionStatus::Draft => "draft",
            VersionStatus::Published => "published",
            VersionStatus::Archived => "archived",
        }
    }

    /// Parse the persisted form
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(VersionStatus::Draft),
            "published" => Some(VersionStatus::Published),
            "archived" => Some(VersionStatus::Archived),
            _ => None,
        }
    }

    /// Only drafts can be published
    pub fn can_publish(&self) -> bool {
        matches!(self, VersionStatus::Draft)
    }

    /// Only the current published version can be demoted
    pub fn can_archive(&self) -> bool {
        matches!(self, VersionStatus::Published)
    }
}

impl std::fmt::Display for VersionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Editor-supplied content for a new version
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VersionContent {
    /// Slot name to ordered widget list
    #[serde(default)]
    pub slots: BTreeMap<String, Vec<WidgetRecord>>,

    /// Optional change description
    #[serde(default)]
    pub description: Option<String>,
}

impl VersionContent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the widgets for one slot, replacing any previous list
    pub fn with_slot(mut self, slot_name: impl Into<String>, widgets: Vec<WidgetRecord>) -> Self {
        self.slots.insert(slot_name.into(), widgets);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Total number of widget placements across all slots
    pub fn widget_count(&self) -> usize {
        self.slots.values().map(Vec::len).sum()
    }
}

/// An immutable snapshot of a page's widget content
///
/// Only `status` and `published_at` ever change after creation, and only
/// through the publish swap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Version {
    /// Unique identifier (UUID v7)
    pub id: String,

    /// Owning page
    pub page_id: String,

    /// Per-page sequence number, starting at 1
    pub sequence: u64,

    pub status: VersionStatus,

    pub created_at: DateTime<Utc>,

    /// Set when the version is promoted to published
    pub published_at: Option<DateTime<Utc>>,

    pub description: Option<String>,

    /// Version whose content this one was copied from by a restore
    pub restored_from: Option<String>,

    /// Slot name to widgets in stored order
    pub slots: BTreeMap<String, Vec<WidgetRecord>>,
}

impl Version {
    /// Widgets placed in a slot, or an empty slice if the slot is absent
    pub fn widgets_in_slot(&self, slot_name: &str) -> &[WidgetRecord] {
        self.slots
            .get(slot_name)
            .map(|w| w.as_slice())
            .unwrap_or(&[])
    }

    /// Deep copy of this version's content, suitable for a new version
    pub fn content(&self) -> VersionContent {
        VersionContent {
            slots: self.slots.clone(),
            description: self.description.clone(),
        }
    }

    pub fn is_current(&self) -> bool {
        self.status == VersionStatus::Published
    }
}

/// Result of an atomic publish swap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishOutcome {
    /// The newly published version
    pub published: Version,

    /// The previously current version, now archived
    pub archived: Option<Version>,
}

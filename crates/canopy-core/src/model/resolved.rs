use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::slot_policy::SlotPolicy;
use super::widget::WidgetRecord;

/// Which version of each page the resolver reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionMode {
    /// Current published versions only
    Live,
    /// Latest draft, falling back to the published version
    Preview,
}

impl ResolutionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionMode::Live => "live",
            ResolutionMode::Preview => "preview",
        }
    }
}

impl std::fmt::Display for ResolutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One widget in a resolved slot, with its provenance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedWidget {
    pub widget: WidgetRecord,

    /// Page that defines the widget
    pub source_page_id: String,

    /// Version of the source page the widget was read from
    pub source_version_id: String,

    /// Tree edges between the source page and the resolved page
    pub depth: u32,

    /// True for every depth > 0
    pub is_inherited: bool,

    /// True when this entry suppressed a deeper widget with the same id
    pub is_overridden: bool,
}

/// The resolved content of one slot on one page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedSlot {
    pub page_id: String,
    pub slot_name: String,
    pub as_of: DateTime<Utc>,
    pub mode: ResolutionMode,

    /// Policy that was applied (the fallback policy when none is registered)
    pub policy: SlotPolicy,

    /// Page IDs consulted, target first
    pub chain: Vec<String>,

    /// Ordered, de-duplicated widgets
    pub widgets: Vec<ResolvedWidget>,
}

impl ResolvedSlot {
    /// Widget IDs in resolved order
    pub fn widget_ids(&self) -> Vec<&str> {
        self.widgets.iter().map(|w| w.widget.id.as_str()).collect()
    }

    /// Whether a page took part in this resolution
    pub fn involves_page(&self, page_id: &str) -> bool {
        self.chain.iter().any(|p| p == page_id)
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }
}

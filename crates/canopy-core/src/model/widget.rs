use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Inheritance level meaning "every descendant, at any depth"
pub const INHERIT_UNBOUNDED: i32 = -1;

/// Inheritance level meaning "only on the defining page"
pub const INHERIT_LOCAL_ONLY: i32 = 0;

/// A widget placement inside one slot of one version
///
/// Records are immutable once their version exists. Identity (`id`) is
/// stable across versions and is what overrides match on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetRecord {
    /// Stable widget identity
    pub id: String,

    /// Widget type tag (e.g. "navigation", "banner")
    pub widget_type: String,

    /// Opaque widget configuration
    #[serde(default)]
    pub config: serde_json::Value,

    /// Position within the slot for this version
    #[serde(default)]
    pub sort_order: i64,

    /// Whether the widget is switched on at all
    #[serde(default = "default_true")]
    pub is_published: bool,

    /// -1 unbounded, 0 local only, n > 0 up to n hops below the defining page
    #[serde(default)]
    pub inheritance_level: i32,

    /// Master switch; false means the widget is never inherited
    #[serde(default = "default_true")]
    pub inherit_from_parent: bool,

    /// Widget becomes visible at this instant (inclusive)
    #[serde(default)]
    pub publish_effective_date: Option<DateTime<Utc>>,

    /// Widget stops being visible after this instant (inclusive)
    #[serde(default)]
    pub publish_expire_date: Option<DateTime<Utc>>,
}

fn default_true() -> bool {
    true
}

impl WidgetRecord {
    /// Create a published, local-only widget with an empty config
    pub fn new(id: impl Into<String>, widget_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            widget_type: widget_type.into(),
            config: serde_json::Value::Null,
            sort_order: 0,
            is_published: true,
            inheritance_level: INHERIT_LOCAL_ONLY,
            inherit_from_parent: true,
            publish_effective_date: None,
            publish_expire_date: None,
        }
    }

    pub fn with_sort_order(mut self, sort_order: i64) -> Self {
        self.sort_order = sort_order;
        self
    }

    pub fn with_inheritance_level(mut self, level: i32) -> Self {
        self.inheritance_level = level;
        self
    }

    pub fn with_inherit_from_parent(mut self, inherit: bool) -> Self {
        self.inherit_from_parent = inherit;
        self
    }

    pub fn with_published(mut self, published: bool) -> Self {
        self.is_published = published;
        self
    }

    pub fn with_config(mut self, config: serde_json::Value) -> Self {
        self.config = config;
        self
    }

    /// Set the visibility window; either end may be open
    pub fn with_window(
        mut self,
        effective: Option<DateTime<Utc>>,
        expire: Option<DateTime<Utc>>,
    ) -> Self {
        self.publish_effective_date = effective;
        self.publish_expire_date = expire;
        self
    }

    /// Check whether the widget can ever reach a descendant page
    pub fn is_inheritable(&self) -> bool {
        self.inherit_from_parent && self.inheritance_level != INHERIT_LOCAL_ONLY
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Page - a node in the site tree
///
/// Pages form a rooted tree through parent pointers. The layout id selects
/// which slot policies apply when widgets are resolved for this page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Unique identifier for this page
    pub id: String,

    /// Human-readable title
    pub title: String,

    /// Parent page ID (None for the root)
    pub parent_id: Option<String>,

    /// Child page IDs in creation order
    pub children: Vec<String>,

    /// Layout identifier used to look up slot policies
    pub layout_id: String,

    /// Timestamp when this page was created
    pub created_at: DateTime<Utc>,
}

impl Page {
    /// Create a new root page with no children
    pub fn new(id: impl Into<String>, title: impl Into<String>, layout_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            parent_id: None,
            children: Vec::new(),
            layout_id: layout_id.into(),
            created_at: Utc::now(),
        }
    }

    /// Set the parent page
    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    /// Check if this page is the root of its tree
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Record a child page ID, ignoring duplicates
    pub fn add_child(&mut self, child_id: String) {
        if !self.children.contains(&child_id) {
            self.children.push(child_id);
        }
    }
}

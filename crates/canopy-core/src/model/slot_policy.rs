use serde::{Deserialize, Serialize};

/// Per-layout, per-slot inheritance policy
///
/// Read-only configuration consulted by the resolver and by draft
/// validation (capacity).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotPolicy {
    /// Whether ancestors are consulted at all for this slot
    pub allows_inheritance: bool,

    /// true: local widgets plus one ancestor level; false: first non-empty level wins
    pub allow_merge: bool,

    /// Maximum number of widgets a single version may place in the slot
    #[serde(default)]
    pub max_widgets: Option<usize>,
}

impl SlotPolicy {
    /// Local widgets only, no inheritance
    ///
    /// Used whenever no policy is registered for a slot.
    pub fn local_only() -> Self {
        Self {
            allows_inheritance: false,
            allow_merge: false,
            max_widgets: None,
        }
    }

    /// Inherit, with local content replacing inherited content
    pub fn replace() -> Self {
        Self {
            allows_inheritance: true,
            allow_merge: false,
            max_widgets: None,
        }
    }

    /// Inherit, appending the nearest ancestor level after local content
    pub fn merge() -> Self {
        Self {
            allows_inheritance: true,
            allow_merge: true,
            max_widgets: None,
        }
    }

    pub fn with_max_widgets(mut self, max: usize) -> Self {
        self.max_widgets = Some(max);
        self
    }
}

impl Default for SlotPolicy {
    fn default() -> Self {
        Self::local_only()
    }
}

//! Visibility filter
//!
//! A widget is live at an instant when it is switched on and the instant
//! falls inside its publish window. Both window ends are inclusive.

use chrono::{DateTime, Utc};

use crate::model::WidgetRecord;

/// Check whether a widget is visible at `at`
///
/// # Example
/// ```
/// use canopy_core::model::WidgetRecord;
/// use canopy_core::visibility::is_visible;
///
/// let widget = WidgetRecord::new("banner", "banner").with_published(false);
/// assert!(!is_visible(&widget, chrono::Utc::now()));
/// ```
pub fn is_visible(widget: &WidgetRecord, at: DateTime<Utc>) -> bool {
    if !widget.is_published {
        return false;
    }
    if let Some(effective) = widget.publish_effective_date {
        if at < effective {
            return false;
        }
    }
    if let Some(expire) = widget.publish_expire_date {
        if at > expire {
            return false;
        }
    }
    true
}

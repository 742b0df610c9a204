use std::collections::HashSet;

use crate::errors::{CanopyError, Result};
use crate::model::widget::INHERIT_UNBOUNDED;
use crate::model::VersionContent;

/// Validate editor-supplied content before it becomes a version
///
/// Slots are checked in name order and widgets in list order, so the first
/// reported violation is deterministic:
///
/// 1. Slot names are non-empty
/// 2. Widget ids are non-empty and unique within their slot
/// 3. Inheritance levels are `-1` or greater
/// 4. Visibility windows do not end before they start
/// 5. No slot exceeds the capacity returned by `capacity_of`
///
/// # Errors
/// Returns the first violation found.
pub fn validate_content<F>(content: &VersionContent, capacity_of: F) -> Result<()>
where
    F: Fn(&str) -> Option<usize>,
{
    for (slot_name, widgets) in &content.slots {
        if slot_name.trim().is_empty() {
            return Err(CanopyError::EmptySlotName);
        }

        let mut seen: HashSet<&str> = HashSet::new();
        for widget in widgets {
            if widget.id.trim().is_empty() {
                return Err(CanopyError::EmptyWidgetId {
                    slot: slot_name.clone(),
                });
            }
            if !seen.insert(widget.id.as_str()) {
                return Err(CanopyError::DuplicateWidgetId {
                    slot: slot_name.clone(),
                    widget_id: widget.id.clone(),
                });
            }
            if widget.inheritance_level < INHERIT_UNBOUNDED {
                return Err(CanopyError::InvalidInheritanceLevel {
                    widget_id: widget.id.clone(),
                    level: widget.inheritance_level,
                });
            }
            if let (Some(effective), Some(expire)) =
                (widget.publish_effective_date, widget.publish_expire_date)
            {
                if effective > expire {
                    return Err(CanopyError::InvalidVisibilityWindow {
                        widget_id: widget.id.clone(),
                    });
                }
            }
        }

        if let Some(limit) = capacity_of(slot_name) {
            if widgets.len() > limit {
                return Err(CanopyError::SlotCapacityExceeded {
                    slot: slot_name.clone(),
                    limit,
                    actual: widgets.len(),
                });
            }
        }
    }

    Ok(())
}

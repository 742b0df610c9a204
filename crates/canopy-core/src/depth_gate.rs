//! Depth gate
//!
//! Decides whether a widget defined on an ancestor may appear on a page
//! `depth` tree edges below it.

use crate::model::widget::{INHERIT_LOCAL_ONLY, INHERIT_UNBOUNDED};
use crate::model::WidgetRecord;

/// Check whether a widget is eligible at `depth`
///
/// Depth 0 is the defining page and is always eligible. Deeper pages need
/// `inherit_from_parent` and an inheritance level that reaches them.
pub fn is_eligible_at_depth(widget: &WidgetRecord, depth: u32) -> bool {
    if depth == 0 {
        return true;
    }
    if !widget.inherit_from_parent {
        return false;
    }
    match widget.inheritance_level {
        INHERIT_UNBOUNDED => true,
        INHERIT_LOCAL_ONLY => false,
        n if n > 0 => depth <= n as u32,
        // below -1 is rejected on save; never inherit such records
        _ => false,
    }
}

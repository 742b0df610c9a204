//! Content digests
//!
//! SHA-256 over the canonical JSON encoding of a version's slot map. Two
//! versions with equal digests place identical widgets in identical slots.

use sha2::{Digest as _, Sha256};
use std::collections::BTreeMap;

use crate::model::{Version, WidgetRecord};

/// Digest of a slot map
///
/// Slots serialize in name order (`BTreeMap`) and widgets in stored order,
/// so the encoding is canonical.
pub fn content_digest(slots: &BTreeMap<String, Vec<WidgetRecord>>) -> String {
    let canonical = serde_json::to_vec(slots).unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(&canonical);
    hex::encode(hasher.finalize())
}

/// Digest of a version's widget content
pub fn version_digest(version: &Version) -> String {
    content_digest(&version.slots)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_is_stable_and_hex() {
        let mut slots = BTreeMap::new();
        slots.insert("header".to_string(), vec![WidgetRecord::new("nav", "navigation")]);

        let a = content_digest(&slots);
        let b = content_digest(&slots.clone());
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_digest_changes_with_widget_config() {
        let mut slots = BTreeMap::new();
        slots.insert("header".to_string(), vec![WidgetRecord::new("nav", "navigation")]);
        let before = content_digest(&slots);

        slots.insert(
            "header".to_string(),
            vec![WidgetRecord::new("nav", "navigation")
                .with_config(serde_json::json!({"depth": 2}))],
        );
        assert_ne!(before, content_digest(&slots));
    }
}

//! Override by identity
//!
//! A shallower widget whose id matches a deeper widget suppresses the
//! deeper one. The surviving shallower entry is flagged `is_overridden`.

use std::collections::HashSet;

use crate::model::ResolvedWidget;

/// Merge two ordered lists, shallower first, dropping deeper duplicates
///
/// Order within each list is preserved. Deeper entries whose id appears in
/// `shallower` are removed and the matching shallower entries are flagged.
pub fn apply_overrides(
    shallower: Vec<ResolvedWidget>,
    deeper: Vec<ResolvedWidget>,
) -> Vec<ResolvedWidget> {
    let deeper_ids: HashSet<&str> = deeper.iter().map(|w| w.widget.id.as_str()).collect();
    let shallower_ids: HashSet<String> =
        shallower.iter().map(|w| w.widget.id.clone()).collect();

    let mut merged: Vec<ResolvedWidget> = shallower
        .into_iter()
        .map(|mut w| {
            if deeper_ids.contains(w.widget.id.as_str()) {
                w.is_overridden = true;
            }
            w
        })
        .collect();

    merged.extend(
        deeper
            .into_iter()
            .filter(|w| !shallower_ids.contains(&w.widget.id)),
    );

    merged
}

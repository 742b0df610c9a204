//! Human-readable summary renderer for version diffs.

use crate::diff::model::{DiffClassification, DiffSeverity, VersionDiff};

/// Render a Markdown summary of a [`VersionDiff`].
///
/// Informational only; the structured diff is the source of truth.
pub fn render_human_summary(diff: &VersionDiff) -> String {
    let mut out = String::new();

    out.push_str("## Version Diff\n\n");

    let class_label = match &diff.classification {
        DiffClassification::Identical => "Identical",
        DiffClassification::NoSemanticChange => "No Semantic Change",
        DiffClassification::Changed => "Changed",
    };
    let severity_label = match &diff.severity {
        DiffSeverity::None => "None",
        DiffSeverity::Informational => "Informational",
        DiffSeverity::Semantic => "Semantic",
        DiffSeverity::Breaking => "Breaking",
    };
    out.push_str(&format!(
        "**Classification**: {class_label}  \n**Severity**: {severity_label}\n\n"
    ));

    out.push_str("### Identity\n\n");
    out.push_str(&format!(
        "| | Version | Sequence | Content Digest |\n\
         |---|---|---|---|\n\
         | A | `{}` | {} | `{}` |\n\
         | B | `{}` | {} | `{}` |\n\n",
        diff.identity.a_version_id,
        diff.identity.a_sequence,
        short(&diff.identity.a_content_digest),
        diff.identity.b_version_id,
        diff.identity.b_sequence,
        short(&diff.identity.b_content_digest),
    ));

    if !diff.field_changes.is_empty() {
        out.push_str("### Field Changes\n\n");
        for (name, change) in &diff.field_changes {
            out.push_str(&format!("- `{}`: {} → {}\n", name, change.old, change.new));
        }
        out.push('\n');
    }

    if diff.classification != DiffClassification::Changed {
        out.push_str("_No widget changes detected._\n");
        return out;
    }

    let slots = &diff.slot_changes;
    if !slots.added.is_empty() || !slots.removed.is_empty() {
        out.push_str("### Slot Changes\n\n");
        if !slots.added.is_empty() {
            out.push_str(&format!("- **Added slots**: {}\n", slots.added.join(", ")));
        }
        if !slots.removed.is_empty() {
            out.push_str(&format!("- **Removed slots**: {}\n", slots.removed.join(", ")));
        }
        out.push('\n');
    }

    for (slot, changes) in &diff.widget_changes {
        out.push_str(&format!("### Slot `{}`\n\n", slot));
        if !changes.added.is_empty() {
            out.push_str(&format!(
                "- **Added widgets** ({}): {}\n",
                changes.added.len(),
                changes.added.join(", ")
            ));
        }
        if !changes.removed.is_empty() {
            out.push_str(&format!(
                "- **Removed widgets** ({}): {}\n",
                changes.removed.len(),
                changes.removed.join(", ")
            ));
        }
        for change in &changes.changed {
            out.push_str(&format!(
                "- `{}` changed: {}\n",
                change.widget_id,
                change.changed_fields.join(", ")
            ));
        }
        if changes.ordering_changed {
            out.push_str("- **Ordering changed**\n");
        }
        out.push('\n');
    }

    out
}

/// Shorten a digest for display (first 12 chars).
fn short(digest: &str) -> &str {
    if digest.len() > 12 {
        &digest[..12]
    } else {
        digest
    }
}

//! Version lifecycle manager
//!
//! `draft -> published -> archived`, plus the rules that pick which version
//! of a page is authoritative for a resolution mode.

pub mod manager;

use serde::{Deserialize, Serialize};

use crate::errors::ExResult;
use crate::model::{ResolutionMode, Version};
use crate::ports::VersionStore;

pub use manager::{compare, create_draft, publish, restore, save_draft};

/// What `restore` produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RestoreMode {
    /// A new draft the editor publishes later
    #[default]
    Draft,
    /// A new version that becomes current immediately
    Publish,
}

/// Select the authoritative version of a page for a resolution mode
///
/// Live mode reads the current published version. Preview mode reads the
/// latest draft when it is newer than the published version, otherwise the
/// published version. Drafts left behind by a later publish are never
/// previewed.
///
/// # Errors
/// Propagates store errors, including `InconsistentState` when a page has
/// more than one published version.
pub fn select_version(
    versions: &dyn VersionStore,
    page_id: &str,
    mode: ResolutionMode,
) -> ExResult<Option<Version>> {
    match mode {
        ResolutionMode::Live => versions.get_published_version(page_id),
        ResolutionMode::Preview => {
            let published = versions.get_published_version(page_id)?;
            let draft = versions.get_latest_draft(page_id)?;
            Ok(match (draft, published) {
                (Some(draft), Some(published)) if draft.sequence < published.sequence => {
                    Some(published)
                }
                (Some(draft), _) => Some(draft),
                (None, published) => published,
            })
        }
    }
}

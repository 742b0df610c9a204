use std::collections::HashSet;

use crate::errors::{CanopyError, ExResult};

/// What a parent lookup found for one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParentLink {
    /// The page exists and has no parent
    Root,
    /// The page exists and points at this parent
    Parent(String),
    /// The page does not exist
    Missing,
}

/// Collect the ancestor chain of a page by following parent pointers
///
/// Returns ancestor IDs nearest first, root last, excluding `page_id`.
/// `parent_of` is the store-specific parent lookup.
///
/// # Errors
/// * `PageNotFound` - If `page_id` doesn't exist
/// * `AncestorChainBroken` - If a parent pointer references a missing page
/// * `CycleDetected` - If a parent pointer revisits a page already on the chain
/// * Any error returned by `parent_of`
pub fn collect_ancestor_chain<F>(page_id: &str, mut parent_of: F) -> ExResult<Vec<String>>
where
    F: FnMut(&str) -> ExResult<ParentLink>,
{
    let mut link = parent_of(page_id)?;
    if link == ParentLink::Missing {
        return Err(CanopyError::PageNotFound {
            page_id: page_id.to_string(),
        }
        .into());
    }

    let mut visited: HashSet<String> = HashSet::new();
    visited.insert(page_id.to_string());
    let mut chain = Vec::new();
    let mut child = page_id.to_string();

    while let ParentLink::Parent(parent_id) = link {
        if !visited.insert(parent_id.clone()) {
            return Err(CanopyError::CycleDetected { page_id: parent_id }.into());
        }

        link = parent_of(&parent_id)?;
        if link == ParentLink::Missing {
            return Err(CanopyError::AncestorChainBroken {
                page_id: child,
                parent_id,
            }
            .into());
        }

        chain.push(parent_id.clone());
        child = parent_id;
    }

    Ok(chain)
}

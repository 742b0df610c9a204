//! Inheritance resolver
//!
//! Computes the widgets shown in one slot of one page by walking the page's
//! ancestor chain. Single-page failures during the walk are logged and
//! degrade that page to contributing nothing; only an unknown target page
//! is an error.

pub mod override_merge;

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tracing::{debug, warn};

use crate::depth_gate::is_eligible_at_depth;
use crate::errors::ExResult;
use crate::lifecycle::select_version;
use crate::model::{ResolutionMode, ResolvedSlot, ResolvedWidget, SlotPolicy};
use crate::ports::{PageHierarchy, SlotPolicyRegistry, VersionStore};
use crate::visibility::is_visible;

pub use override_merge::apply_overrides;

/// Which slot to resolve, where, and when
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SlotRequest {
    pub page_id: String,
    pub slot_name: String,
    pub as_of: DateTime<Utc>,
    pub mode: ResolutionMode,
}

impl SlotRequest {
    pub fn new(
        page_id: impl Into<String>,
        slot_name: impl Into<String>,
        as_of: DateTime<Utc>,
        mode: ResolutionMode,
    ) -> Self {
        Self {
            page_id: page_id.into(),
            slot_name: slot_name.into(),
            as_of,
            mode,
        }
    }

    /// Resolve against published versions
    pub fn live(
        page_id: impl Into<String>,
        slot_name: impl Into<String>,
        as_of: DateTime<Utc>,
    ) -> Self {
        Self::new(page_id, slot_name, as_of, ResolutionMode::Live)
    }

    /// Resolve against latest drafts
    pub fn preview(
        page_id: impl Into<String>,
        slot_name: impl Into<String>,
        as_of: DateTime<Utc>,
    ) -> Self {
        Self::new(page_id, slot_name, as_of, ResolutionMode::Preview)
    }
}

/// Resolve one slot of one page
///
/// 1. Depth 0 is the target page; ancestors follow at depth 1, 2, ...
/// 2. The target layout's slot policy decides whether ancestors are walked
///    and whether their widgets merge with or replace local widgets.
/// 3. Each page contributes the widgets of its authoritative version that
///    pass the visibility filter at `as_of` and the depth gate.
/// 4. At most one ancestor level contributes: the nearest non-empty one.
/// 5. Local widgets override inherited widgets with the same id.
/// 6. Output is ordered by `(is_inherited, sort_order)`.
///
/// # Errors
/// Returns the hierarchy's error (normally `NotFound`) when the target page
/// cannot be loaded. Nothing else fails the resolution.
pub fn resolve_slot(
    hierarchy: &dyn PageHierarchy,
    versions: &dyn VersionStore,
    policies: &dyn SlotPolicyRegistry,
    request: &SlotRequest,
) -> ExResult<ResolvedSlot> {
    let target = hierarchy.get_page(&request.page_id).map_err(|e| {
        e.with_op("resolve_slot")
            .with_page_id(request.page_id.as_str())
            .with_slot(request.slot_name.as_str())
    })?;

    let policy = lookup_policy(policies, &target.layout_id, request);

    let mut chain = vec![target.id.clone()];
    let local = eligible_widgets(versions, &target.id, 0, request);

    let walk_ancestors = policy.allows_inheritance && (policy.allow_merge || local.is_empty());
    let inherited = if walk_ancestors {
        nearest_ancestor_level(hierarchy, versions, &target.id, target.parent_id, request, &mut chain)
    } else {
        Vec::new()
    };

    let mut widgets = if policy.allow_merge {
        apply_overrides(local, inherited)
    } else if local.is_empty() {
        inherited
    } else {
        local
    };
    widgets.sort_by_key(|w| (w.is_inherited, w.widget.sort_order));

    debug!(
        page_id = %request.page_id,
        slot = %request.slot_name,
        mode = %request.mode,
        allow_merge = policy.allow_merge,
        chain_len = chain.len(),
        widget_count = widgets.len(),
        "slot resolved"
    );

    Ok(ResolvedSlot {
        page_id: request.page_id.clone(),
        slot_name: request.slot_name.clone(),
        as_of: request.as_of,
        mode: request.mode,
        policy,
        chain,
        widgets,
    })
}

fn lookup_policy(
    policies: &dyn SlotPolicyRegistry,
    layout_id: &str,
    request: &SlotRequest,
) -> SlotPolicy {
    match policies.get_slot_policy(layout_id, &request.slot_name) {
        Ok(Some(policy)) => policy,
        Ok(None) => {
            warn!(
                page_id = %request.page_id,
                slot = %request.slot_name,
                layout_id,
                "no slot policy registered, resolving local widgets only"
            );
            SlotPolicy::local_only()
        }
        Err(err) => {
            warn!(
                page_id = %request.page_id,
                slot = %request.slot_name,
                layout_id,
                err.code = err.code(),
                error = %err,
                "slot policy lookup failed, resolving local widgets only"
            );
            SlotPolicy::local_only()
        }
    }
}

/// Walk upward until some ancestor level yields an eligible widget
fn nearest_ancestor_level(
    hierarchy: &dyn PageHierarchy,
    versions: &dyn VersionStore,
    target_id: &str,
    first_parent: Option<String>,
    request: &SlotRequest,
    chain: &mut Vec<String>,
) -> Vec<ResolvedWidget> {
    let mut visited: HashSet<String> = HashSet::new();
    visited.insert(target_id.to_string());

    let mut current = first_parent;
    let mut depth: u32 = 0;

    while let Some(page_id) = current {
        depth += 1;
        if !visited.insert(page_id.clone()) {
            warn!(
                page_id = %request.page_id,
                ancestor_id = %page_id,
                "cycle in ancestor chain, stopping walk"
            );
            break;
        }
        chain.push(page_id.clone());

        let level = eligible_widgets(versions, &page_id, depth, request);
        if !level.is_empty() {
            return level;
        }

        current = match hierarchy.get_parent(&page_id) {
            Ok(parent) => parent,
            Err(err) => {
                warn!(
                    page_id = %request.page_id,
                    ancestor_id = %page_id,
                    depth,
                    err.code = err.code(),
                    error = %err,
                    "ancestor lookup failed, stopping walk"
                );
                None
            }
        };
    }

    Vec::new()
}

/// Widgets of one page's authoritative version that survive both gates
fn eligible_widgets(
    versions: &dyn VersionStore,
    page_id: &str,
    depth: u32,
    request: &SlotRequest,
) -> Vec<ResolvedWidget> {
    let version = match select_version(versions, page_id, request.mode) {
        Ok(Some(version)) => version,
        Ok(None) => {
            debug!(page_id, depth, mode = %request.mode, "no resolvable version");
            return Vec::new();
        }
        Err(err) => {
            warn!(
                page_id,
                depth,
                mode = %request.mode,
                err.code = err.code(),
                error = %err,
                "version lookup failed, page contributes nothing"
            );
            return Vec::new();
        }
    };

    let mut widgets: Vec<ResolvedWidget> = version
        .widgets_in_slot(&request.slot_name)
        .iter()
        .filter(|w| is_visible(w, request.as_of) && is_eligible_at_depth(w, depth))
        .map(|w| ResolvedWidget {
            widget: w.clone(),
            source_page_id: page_id.to_string(),
            source_version_id: version.id.clone(),
            depth,
            is_inherited: depth > 0,
            is_overridden: false,
        })
        .collect();
    widgets.sort_by_key(|w| w.widget.sort_order);
    widgets
}

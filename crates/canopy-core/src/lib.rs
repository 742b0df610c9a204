//! Canopy Core - widget inheritance and version resolution
//!
//! This crate provides the domain model and pure algorithms for resolving
//! which widgets a page shows, including:
//! - Page, version, widget and slot policy models
//! - Visibility filter and depth gate
//! - Inheritance resolver with merge/replace policies and identity overrides
//! - Version lifecycle (draft, publish, restore, compare)
//! - Store traits plus a thread-safe in-memory reference store
//! - Structured error and logging facilities

pub mod config;
pub mod depth_gate;
pub mod diff;
pub mod digest;
pub mod errors;
pub mod lifecycle;
pub mod logging_facility;
pub mod model;
pub mod ops;
pub mod ports;
pub mod resolver;
pub mod rules;
pub mod traversal;
pub mod visibility;

// Used by the logging macros
#[doc(hidden)]
pub use canopy_core_types;

// Re-export commonly used types
pub use config::CanopyConfig;
pub use errors::{CanopyError, ExError, ExErrorKind, ExResult, Result};
pub use lifecycle::RestoreMode;
pub use model::{
    Page, PublishOutcome, ResolutionMode, ResolvedSlot, ResolvedWidget, SlotPolicy, Version,
    VersionContent, VersionStatus, WidgetRecord,
};
pub use ops::Store;
pub use ports::{
    InvalidationHook, NoopInvalidationHook, PageHierarchy, SlotPolicyRegistry, VersionStore,
};
pub use resolver::{resolve_slot, SlotRequest};

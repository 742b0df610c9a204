//! Version diff engine.
//!
//! Compares two versions and produces a structured, deterministic diff
//! plus a Markdown summary for editors.
//!
//! ## Entry point
//!
//! ```ignore
//! use canopy_core::diff::engine::compute_version_diff;
//!
//! let diff = compute_version_diff(&a, &b)?;
//! let summary = canopy_core::diff::human_summary::render_human_summary(&diff);
//! ```
//!
//! ## Guarantees
//!
//! - **Determinism**: identical inputs produce identical structured output.
//! - **Identity**: comparing a version with itself yields an empty diff.
//! - **Noise suppression**: sequence numbers and timestamps are never
//!   reported as changes.

pub mod engine;
pub mod human_summary;
pub mod model;

pub use engine::compute_version_diff;
pub use human_summary::render_human_summary;
pub use model::VersionDiff;

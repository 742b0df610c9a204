//! Canopy Store - SQLite persistence for pages, versions and slot policies
//!
//! Provides:
//! - SQLite schema with a checksummed migrations framework
//! - `SqliteStore`, implementing the core store traits on one connection
//!
//! The publish swap runs inside an immediate transaction, and a partial
//! unique index keeps at most one published version per page.

pub mod db;
pub mod errors;
pub mod migrations;
pub mod repo;

// Re-export key types
pub use errors::Result;
pub use repo::SqliteStore;

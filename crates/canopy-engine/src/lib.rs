//! Canopy Engine - Orchestration layer
//!
//! Wires the store traits, the resolution cache and the configuration into
//! one `Engine`, and exposes the write operations as an `EngineCommand`
//! inventory.

pub mod cache;
pub mod commands;
pub mod engine;

pub use cache::{CacheStats, ResolutionCache};
pub use commands::engine_command::{apply_engine_command, EngineCommand, EngineCommandResult};
pub use engine::Engine;

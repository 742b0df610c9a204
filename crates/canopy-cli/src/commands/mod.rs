//! Subcommand implementations
//!
//! Every command opens the store named by `--db`, loads `--config` when the
//! file exists, and initialises logging from it.

pub mod diff;
pub mod draft;
pub mod init;
pub mod page;
pub mod policy;
pub mod publish;
pub mod resolve;
pub mod restore;
pub mod versions;

use canopy_core::logging_facility;
use canopy_core::model::Version;
use canopy_core::CanopyConfig;
use canopy_engine::Engine;
use canopy_store::SqliteStore;
use clap::Args;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Database and config locations shared by every command
#[derive(Debug, Clone, Args)]
pub struct StoreArgs {
    #[arg(long, default_value = ".canopy/canopy.db")]
    pub db: PathBuf,

    #[arg(long, default_value = ".canopy/config.toml")]
    pub config: PathBuf,
}

impl StoreArgs {
    pub fn load_config(&self) -> Result<CanopyConfig, Box<dyn std::error::Error>> {
        let config = CanopyConfig::load_or_default(&self.config)?;
        logging_facility::init(config.logging.profile);
        Ok(config)
    }

    /// Open the store directly, for page and policy administration
    pub fn open_store(&self) -> Result<SqliteStore, Box<dyn std::error::Error>> {
        self.load_config()?;
        ensure_parent_dir(&self.db)?;
        Ok(SqliteStore::open(&self.db)?)
    }

    /// Open an engine over the store
    pub fn open_engine(&self) -> Result<(Engine, Arc<SqliteStore>), Box<dyn std::error::Error>> {
        let config = self.load_config()?;
        ensure_parent_dir(&self.db)?;
        Ok(Engine::open_sqlite(&self.db, config)?)
    }
}

pub fn ensure_parent_dir(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

pub fn print_version(action: &str, version: &Version) {
    println!("{} {}", action, version.id);
    println!("  page_id: {}", version.page_id);
    println!("  sequence: {}", version.sequence);
    println!("  status: {}", version.status);
    if let Some(restored_from) = &version.restored_from {
        println!("  restored_from: {}", restored_from);
    }
}

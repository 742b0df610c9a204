//! Store initialisation

use canopy_core::CanopyConfig;
use clap::Args;

use super::{ensure_parent_dir, CliResult, StoreArgs};

#[derive(Debug, Args)]
pub struct InitArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Overwrite an existing config file with the defaults
    #[arg(long)]
    pub force: bool,
}

pub fn execute(args: InitArgs) -> CliResult {
    if args.force || !args.store.config.exists() {
        ensure_parent_dir(&args.store.config)?;
        std::fs::write(&args.store.config, CanopyConfig::default().to_toml_string()?)?;
        println!("Wrote config {}", args.store.config.display());
    }

    args.store.open_store()?;
    println!("Initialized store {}", args.store.db.display());
    Ok(())
}

//! Version history listing

use canopy_core::VersionStore;
use clap::Args;

use super::{CliResult, StoreArgs};

#[derive(Debug, Args)]
pub struct VersionsArgs {
    pub page: String,

    #[command(flatten)]
    pub store: StoreArgs,
}

pub fn execute(args: VersionsArgs) -> CliResult {
    let store = args.store.open_store()?;
    for v in store.list_versions(&args.page)? {
        println!(
            "{}\t{}\t{}\t{}",
            v.sequence,
            v.status,
            v.id,
            v.description.as_deref().unwrap_or("")
        );
    }
    Ok(())
}

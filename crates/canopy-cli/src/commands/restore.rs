//! Restore command

use canopy_core::RestoreMode;
use canopy_core_types::RequestContext;
use canopy_engine::{apply_engine_command, EngineCommand, EngineCommandResult};
use clap::{Args, ValueEnum};

use super::{print_version, CliResult, StoreArgs};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RestoreAs {
    Draft,
    Publish,
}

#[derive(Debug, Args)]
pub struct RestoreArgs {
    pub page: String,

    /// Historical version to copy
    pub version: String,

    /// Defaults to `lifecycle.restore_mode` from the config
    #[arg(long, value_enum)]
    pub mode: Option<RestoreAs>,

    #[command(flatten)]
    pub store: StoreArgs,
}

pub fn execute(args: RestoreArgs) -> CliResult {
    let (engine, _store) = args.store.open_engine()?;
    let cmd = EngineCommand::Restore {
        page_id: args.page,
        version_id: args.version,
        mode: args.mode.map(|m| match m {
            RestoreAs::Draft => RestoreMode::Draft,
            RestoreAs::Publish => RestoreMode::Publish,
        }),
    };

    match apply_engine_command(&engine, cmd, &RequestContext::new())? {
        EngineCommandResult::Restore(version) => print_version("Restored", &version),
        other => return Err(format!("unexpected command result: {other:?}").into()),
    }
    Ok(())
}

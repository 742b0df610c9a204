//! Publish command

use canopy_core_types::RequestContext;
use canopy_engine::{apply_engine_command, EngineCommand, EngineCommandResult};
use clap::Args;

use super::{print_version, CliResult, StoreArgs};

#[derive(Debug, Args)]
pub struct PublishArgs {
    pub version: String,

    #[command(flatten)]
    pub store: StoreArgs,
}

pub fn execute(args: PublishArgs) -> CliResult {
    let (engine, _store) = args.store.open_engine()?;
    let cmd = EngineCommand::Publish {
        version_id: args.version,
        at: None,
    };

    match apply_engine_command(&engine, cmd, &RequestContext::new())? {
        EngineCommandResult::Publish(outcome) => {
            print_version("Published", &outcome.published);
            if let Some(archived) = outcome.archived {
                println!("  archived: {}", archived.id);
            }
        }
        other => return Err(format!("unexpected command result: {other:?}").into()),
    }
    Ok(())
}

//! Draft creation and editing

use canopy_core::VersionContent;
use canopy_core_types::RequestContext;
use canopy_engine::{apply_engine_command, EngineCommand, EngineCommandResult};
use clap::{Args, Subcommand};
use std::path::PathBuf;

use super::{print_version, CliResult, StoreArgs};

#[derive(Debug, Args)]
pub struct DraftArgs {
    #[command(subcommand)]
    pub command: DraftCommand,
}

#[derive(Debug, Subcommand)]
pub enum DraftCommand {
    /// Start a draft, optionally copying an existing version
    Create(CreateArgs),
    /// Save slot content from a JSON file as a new draft
    Save(SaveArgs),
}

#[derive(Debug, Args)]
pub struct CreateArgs {
    pub page: String,

    #[arg(long)]
    pub base: Option<String>,

    #[command(flatten)]
    pub store: StoreArgs,
}

#[derive(Debug, Args)]
pub struct SaveArgs {
    pub page: String,

    /// JSON file holding `{"slots": {...}, "description": ...}`
    #[arg(long)]
    pub content: PathBuf,

    #[command(flatten)]
    pub store: StoreArgs,
}

pub fn execute(args: DraftArgs) -> CliResult {
    match args.command {
        DraftCommand::Create(create) => execute_create(create),
        DraftCommand::Save(save) => execute_save(save),
    }
}

fn execute_create(args: CreateArgs) -> CliResult {
    let (engine, _store) = args.store.open_engine()?;
    let cmd = EngineCommand::CreateDraft {
        page_id: args.page,
        base_version_id: args.base,
    };

    match apply_engine_command(&engine, cmd, &RequestContext::new())? {
        EngineCommandResult::CreateDraft(version) => print_version("Created draft", &version),
        other => return Err(format!("unexpected command result: {other:?}").into()),
    }
    Ok(())
}

fn execute_save(args: SaveArgs) -> CliResult {
    let raw = std::fs::read_to_string(&args.content)?;
    let content: VersionContent = serde_json::from_str(&raw)?;

    let (engine, _store) = args.store.open_engine()?;
    let cmd = EngineCommand::SaveDraft {
        page_id: args.page,
        content,
    };

    match apply_engine_command(&engine, cmd, &RequestContext::new())? {
        EngineCommandResult::SaveDraft(version) => print_version("Saved draft", &version),
        other => return Err(format!("unexpected command result: {other:?}").into()),
    }
    Ok(())
}

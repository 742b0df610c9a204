//! Slot policy administration

use canopy_core::SlotPolicy;
use clap::{Args, Subcommand, ValueEnum};

use super::{CliResult, StoreArgs};

#[derive(Debug, Args)]
pub struct PolicyArgs {
    #[command(subcommand)]
    pub command: PolicyCommand,
}

#[derive(Debug, Subcommand)]
pub enum PolicyCommand {
    /// Register or replace the policy of a layout's slot
    Set(SetArgs),
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PolicyMode {
    /// Local widgets only
    Local,
    /// Local widgets, or the nearest ancestor level when there are none
    Replace,
    /// Local widgets followed by the nearest ancestor level
    Merge,
}

#[derive(Debug, Args)]
pub struct SetArgs {
    pub slot: String,

    #[arg(long, value_enum)]
    pub mode: PolicyMode,

    #[arg(long, default_value = "default")]
    pub layout: String,

    #[arg(long)]
    pub max_widgets: Option<usize>,

    #[command(flatten)]
    pub store: StoreArgs,
}

pub fn execute(args: PolicyArgs) -> CliResult {
    match args.command {
        PolicyCommand::Set(set) => execute_set(set),
    }
}

fn execute_set(args: SetArgs) -> CliResult {
    let store = args.store.open_store()?;
    let mut policy = match args.mode {
        PolicyMode::Local => SlotPolicy::local_only(),
        PolicyMode::Replace => SlotPolicy::replace(),
        PolicyMode::Merge => SlotPolicy::merge(),
    };
    if let Some(max) = args.max_widgets {
        policy = policy.with_max_widgets(max);
    }

    store.set_slot_policy(&args.layout, &args.slot, policy)?;
    println!("Set policy {}/{} to {:?}", args.layout, args.slot, args.mode);
    Ok(())
}

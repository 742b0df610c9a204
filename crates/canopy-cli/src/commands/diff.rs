//! Version diff command

use canopy_core::diff::render_human_summary;
use clap::{Args, ValueEnum};

use super::{CliResult, StoreArgs};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DiffFormat {
    Markdown,
    Json,
}

#[derive(Debug, Args)]
pub struct DiffArgs {
    pub a: String,
    pub b: String,

    #[arg(long, value_enum, default_value = "markdown")]
    pub format: DiffFormat,

    #[command(flatten)]
    pub store: StoreArgs,
}

pub fn execute(args: DiffArgs) -> CliResult {
    let (engine, _store) = args.store.open_engine()?;
    let diff = engine.compare(&args.a, &args.b)?;

    match args.format {
        DiffFormat::Markdown => print!("{}", render_human_summary(&diff)),
        DiffFormat::Json => println!("{}", serde_json::to_string_pretty(&diff)?),
    }
    Ok(())
}

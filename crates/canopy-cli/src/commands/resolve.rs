//! Slot resolution command

use canopy_core::SlotRequest;
use chrono::{DateTime, Utc};
use clap::{Args, ValueEnum};

use super::{CliResult, StoreArgs};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ResolveFormat {
    Text,
    Json,
}

#[derive(Debug, Args)]
pub struct ResolveArgs {
    pub page: String,
    pub slot: String,

    /// Read latest drafts instead of published versions
    #[arg(long)]
    pub preview: bool,

    /// Reference time (RFC 3339); defaults to now
    #[arg(long)]
    pub at: Option<DateTime<Utc>>,

    #[arg(long, value_enum, default_value = "text")]
    pub format: ResolveFormat,

    #[command(flatten)]
    pub store: StoreArgs,
}

pub fn execute(args: ResolveArgs) -> CliResult {
    let (engine, _store) = args.store.open_engine()?;
    let at = args.at.unwrap_or_else(Utc::now);
    let request = if args.preview {
        SlotRequest::preview(args.page, args.slot, at)
    } else {
        SlotRequest::live(args.page, args.slot, at)
    };

    let resolved = engine.resolve_slot(&request)?;
    match args.format {
        ResolveFormat::Json => println!("{}", serde_json::to_string_pretty(&*resolved)?),
        ResolveFormat::Text => {
            for w in &resolved.widgets {
                println!(
                    "{}\t{}\tdepth={}\tfrom={}{}",
                    w.widget.id,
                    w.widget.widget_type,
                    w.depth,
                    w.source_page_id,
                    if w.is_overridden { "\toverrides" } else { "" }
                );
            }
        }
    }
    Ok(())
}

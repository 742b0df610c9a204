//! Canopy CLI
//!
//! Command-line interface over a SQLite-backed Canopy store

use clap::{Parser, Subcommand};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "canopy")]
#[command(about = "Canopy - Widget inheritance and page versioning", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Create the database and a default config file
    Init(commands::init::InitArgs),
    /// Page tree operations
    Page(commands::page::PageArgs),
    /// Slot policy operations
    Policy(commands::policy::PolicyArgs),
    /// Draft operations
    Draft(commands::draft::DraftArgs),
    /// Make a draft the page's current version
    Publish(commands::publish::PublishArgs),
    /// Copy a historical version forward
    Restore(commands::restore::RestoreArgs),
    /// Compare two versions
    Diff(commands::diff::DiffArgs),
    /// Resolve the widgets of one slot on one page
    Resolve(commands::resolve::ResolveArgs),
    /// List a page's versions
    Versions(commands::versions::VersionsArgs),
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init(args) => commands::init::execute(args),
        Commands::Page(args) => commands::page::execute(args),
        Commands::Policy(args) => commands::policy::execute(args),
        Commands::Draft(args) => commands::draft::execute(args),
        Commands::Publish(args) => commands::publish::execute(args),
        Commands::Restore(args) => commands::restore::execute(args),
        Commands::Diff(args) => commands::diff::execute(args),
        Commands::Resolve(args) => commands::resolve::execute(args),
        Commands::Versions(args) => commands::versions::execute(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

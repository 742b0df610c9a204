//! Page tree administration

use canopy_core::Page;
use clap::{Args, Subcommand};

use super::{CliResult, StoreArgs};

#[derive(Debug, Args)]
pub struct PageArgs {
    #[command(subcommand)]
    pub command: PageCommand,
}

#[derive(Debug, Subcommand)]
pub enum PageCommand {
    /// Add a page under an existing parent (or as a root)
    Add(AddArgs),
    /// List all pages
    List(ListArgs),
}

#[derive(Debug, Args)]
pub struct AddArgs {
    pub id: String,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub parent: Option<String>,

    #[arg(long, default_value = "default")]
    pub layout: String,

    #[command(flatten)]
    pub store: StoreArgs,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub store: StoreArgs,
}

pub fn execute(args: PageArgs) -> CliResult {
    match args.command {
        PageCommand::Add(add) => execute_add(add),
        PageCommand::List(list) => execute_list(list),
    }
}

fn execute_add(args: AddArgs) -> CliResult {
    let store = args.store.open_store()?;
    let title = args.title.unwrap_or_else(|| args.id.clone());
    let mut page = Page::new(args.id, title, args.layout);
    if let Some(parent) = args.parent {
        page = page.with_parent(parent);
    }

    let page = store.create_page(page)?;
    println!("Added page {}", page.id);
    Ok(())
}

fn execute_list(args: ListArgs) -> CliResult {
    let store = args.store.open_store()?;
    for page in store.list_pages()? {
        println!(
            "{}\t{}\t{}\t{}",
            page.id,
            page.parent_id.as_deref().unwrap_or("-"),
            page.layout_id,
            page.title
        );
    }
    Ok(())
}

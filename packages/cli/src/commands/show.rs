use super::{load_config, page_key, ServerArgs};
use anyhow::Result;
use clap::Args;
use pagecraft_store::PageStore;
use std::path::Path;

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Page to print (defaults to the configured page)
    pub page: Option<String>,

    /// Owner the page belongs to
    #[arg(short, long)]
    pub user: Option<String>,

    #[command(flatten)]
    pub server: ServerArgs,
}

pub async fn show(args: ShowArgs, cwd: &Path) -> Result<()> {
    let config = load_config(cwd)?;
    let store = args.server.store(&config)?;
    let key = page_key(args.page.as_deref(), args.user.as_deref(), &config)?;

    let markup = store.load(&key).await?;
    println!("{}", markup);
    Ok(())
}

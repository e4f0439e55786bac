use super::{load_config, ServerArgs};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use pagecraft_store::PageStore;
use std::path::Path;

#[derive(Debug, Args)]
pub struct ResetArgs {
    /// Confirm deleting every page
    #[arg(short, long)]
    pub yes: bool,

    #[command(flatten)]
    pub server: ServerArgs,
}

pub async fn reset(args: ResetArgs, cwd: &Path) -> Result<()> {
    let config = load_config(cwd)?;
    let store = args.server.store(&config)?;

    if !args.yes {
        println!(
            "{} This deletes every page on {}. Re-run with --yes to confirm.",
            "⚠️".yellow(),
            store.base_url().bright_white()
        );
        return Ok(());
    }

    store.reset().await?;
    println!("  {} Cleared pages on {}", "✓".green(), store.base_url());
    Ok(())
}

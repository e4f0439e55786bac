use super::{load_config, page_key, ServerArgs};
use crate::script::{self, Destination, Script};
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use pagecraft_editor::{EditorSession, LoadSource};
use pagecraft_store::HttpPageStore;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct ReplayArgs {
    /// JSON script of editor steps
    pub script: PathBuf,

    /// Page to edit (defaults to the configured page)
    #[arg(short, long)]
    pub page: Option<String>,

    /// Owner the page belongs to
    #[arg(short, long)]
    pub user: Option<String>,

    /// Edit a local HTML file instead of a page on the server
    #[arg(long, conflicts_with_all = ["page", "user"])]
    pub file: Option<PathBuf>,

    /// Where to write the result when editing a local file
    #[arg(short, long, requires = "file")]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub server: ServerArgs,
}

pub async fn replay(args: ReplayArgs, cwd: &Path) -> Result<()> {
    let config = load_config(cwd)?;
    let steps = Script::from_path(&args.script)?;
    let mut session = EditorSession::headless(config.clone());

    println!("{}", "🖊  Replaying editor script...".bright_blue().bold());

    let reports = match &args.file {
        Some(path) => {
            let markup = fs::read_to_string(path)
                .with_context(|| format!("Cannot read {}", path.display()))?;
            report_load(session.load_document(&markup)?, &path.display().to_string());
            script::run::<_, HttpPageStore>(&mut session, &steps, None).await?
        }
        None => {
            let store = args.server.store(&config)?;
            let key = page_key(args.page.as_deref(), args.user.as_deref(), &config)?;
            report_load(session.load_page(&store, &key).await?, &key.to_string());
            script::run(
                &mut session,
                &steps,
                Some(Destination {
                    store: &store,
                    key: &key,
                }),
            )
            .await?
        }
    };

    for report in &reports {
        println!("  {} {:>3} {}", "✓".green(), report.step + 1, report.summary);
    }

    if let Some(notice) = session.take_notice() {
        println!("  {}", notice.to_string().cyan());
    }

    let history = session.history();
    println!();
    println!(
        "{} {} steps, {} history entries (at {})",
        "Done:".green().bold(),
        reports.len(),
        history.len(),
        history.cursor().map(|c| c + 1).unwrap_or(0)
    );

    if args.file.is_some() {
        let markup = session.document_markup()?;
        match &args.output {
            Some(output) => {
                fs::write(output, markup)?;
                println!("  Wrote {}", output.display());
            }
            None => println!("{}", markup),
        }
    } else if session.has_unsaved_changes() {
        println!(
            "{}",
            "⚠️  Unsaved changes (add a \"save\" step to persist)".yellow()
        );
    }

    Ok(())
}

fn report_load(source: LoadSource, name: &str) {
    match source {
        LoadSource::Requested => println!("  {} Loaded {}", "✓".green(), name),
        LoadSource::Fallback => println!(
            "  {} {} unavailable, editing a blank page",
            "⚠️".yellow(),
            name
        ),
    }
}

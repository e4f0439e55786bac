mod commands;
mod script;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{init, replay, reset, show, InitArgs, ReplayArgs, ResetArgs, ShowArgs};

/// Pagecraft CLI - drive the page editor from the terminal
#[derive(Parser, Debug)]
#[command(name = "pagecraft")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a pagecraft.config.json with default settings
    Init(InitArgs),

    /// Load a page, apply a scripted editing session and save the result
    Replay(ReplayArgs),

    /// Print a stored page
    Show(ShowArgs),

    /// Clear every page on the page server
    Reset(ResetArgs),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let cwd = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(err) => {
            eprintln!("{} Cannot get current directory: {}", "Error:".red().bold(), err);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Command::Init(args) => init(args, &cwd),
        Command::Replay(args) => replay(args, &cwd).await,
        Command::Show(args) => show(args, &cwd).await,
        Command::Reset(args) => reset(args, &cwd).await,
    };

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}

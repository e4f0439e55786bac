use anyhow::Result;
use clap::Args;
use colored::Colorize;
use pagecraft_editor::{EditorConfig, DEFAULT_CONFIG_NAME};
use std::fs;
use std::path::Path;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Page server URL
    #[arg(short, long)]
    pub server: Option<String>,

    /// Page opened when none is named
    #[arg(short, long)]
    pub page: Option<String>,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &Path) -> Result<()> {
    let config_path = cwd.join(DEFAULT_CONFIG_NAME);

    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    let mut config = EditorConfig::default();
    if let Some(server) = args.server {
        config.server_url = server;
    }
    if let Some(page) = args.page {
        config.default_page = page;
    }

    let json = serde_json::to_string_pretty(&config)?;
    fs::write(&config_path, json)?;

    println!(
        "  {} Created {}",
        "✓".green(),
        DEFAULT_CONFIG_NAME.bright_white()
    );
    println!("  Server: {}", config.server_url.cyan());
    println!("  Page:   {}", config.default_page.cyan());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_writes_loadable_config() {
        let dir = std::env::temp_dir().join(format!("pagecraft-init-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();

        init(
            InitArgs {
                server: Some("http://pages.test".to_string()),
                page: None,
                force: true,
            },
            &dir,
        )
        .unwrap();

        let config = EditorConfig::load(&dir).unwrap();
        assert_eq!(config.server_url, "http://pages.test");
        assert_eq!(config.default_page, "homepage.html");

        fs::remove_dir_all(&dir).unwrap();
    }
}

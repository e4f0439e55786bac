pub mod init;
pub mod replay;
pub mod reset;
pub mod show;

pub use init::{init, InitArgs};
pub use replay::{replay, ReplayArgs};
pub use reset::{reset, ResetArgs};
pub use show::{show, ShowArgs};

use anyhow::Result;
use clap::Args;
use pagecraft_editor::{EditorConfig, PageKey};
use pagecraft_store::HttpPageStore;
use std::path::Path;

/// Page server options shared by the networked commands
#[derive(Debug, Args)]
pub struct ServerArgs {
    /// Page server URL (overrides config)
    #[arg(long)]
    pub server: Option<String>,

    /// Request timeout in milliseconds (overrides config)
    #[arg(long)]
    pub timeout_ms: Option<u64>,
}

impl ServerArgs {
    pub fn store(&self, config: &EditorConfig) -> Result<HttpPageStore> {
        let url = self.server.as_deref().unwrap_or(&config.server_url);
        let timeout = self
            .timeout_ms
            .map(std::time::Duration::from_millis)
            .unwrap_or_else(|| config.request_timeout());
        Ok(HttpPageStore::with_timeout(url, timeout)?)
    }
}

pub fn load_config(cwd: &Path) -> Result<EditorConfig> {
    Ok(EditorConfig::load(cwd)?)
}

/// Page name from the argument or the configured default, scoped to `user`
pub fn page_key(page: Option<&str>, user: Option<&str>, config: &EditorConfig) -> Result<PageKey> {
    let key = PageKey::new(page.unwrap_or(&config.default_page))?;
    Ok(match user {
        Some(user) => key.owned_by(user),
        None => key,
    })
}

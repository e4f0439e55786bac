use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONFIG_NAME: &str = "pagecraft.config.json";

/// Editor configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    /// Text placed in a freshly inserted text block
    #[serde(default = "default_placeholder_text")]
    pub placeholder_text: String,

    #[serde(default = "default_font_size")]
    pub default_font_size: String,

    #[serde(default = "default_text_color")]
    pub default_text_color: String,

    /// Deactivate the text tool after one insertion
    #[serde(default = "default_true")]
    pub single_shot_insert: bool,

    /// Smallest width/height a resize may produce, in px
    #[serde(default = "default_min_resize_px")]
    pub min_resize_px: f64,

    /// Maximum history entries (0 = unlimited)
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Ask the host to persist after every committed edit
    #[serde(default)]
    pub save_on_commit: bool,

    /// Page server base URL
    #[serde(default = "default_server_url")]
    pub server_url: String,

    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Page opened when none is named
    #[serde(default = "default_page")]
    pub default_page: String,
}

fn default_placeholder_text() -> String {
    "Type here...".to_string()
}

fn default_font_size() -> String {
    "16px".to_string()
}

fn default_text_color() -> String {
    "#000000".to_string()
}

fn default_true() -> bool {
    true
}

fn default_min_resize_px() -> f64 {
    10.0
}

fn default_history_limit() -> usize {
    100
}

fn default_server_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_page() -> String {
    "homepage.html".to_string()
}

impl EditorConfig {
    /// Load config from a directory, falling back to defaults if the file
    /// does not exist
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        let config_path = dir.join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Ok(serde_json::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            placeholder_text: default_placeholder_text(),
            default_font_size: default_font_size(),
            default_text_color: default_text_color(),
            single_shot_insert: true,
            min_resize_px: default_min_resize_px(),
            history_limit: default_history_limit(),
            save_on_commit: false,
            server_url: default_server_url(),
            request_timeout_ms: default_request_timeout_ms(),
            default_page: default_page(),
        }
    }
}

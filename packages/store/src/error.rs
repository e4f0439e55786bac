//! Error types for page persistence

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Page not found: {0}")]
    NotFound(String),

    #[error("Invalid page key: {0}")]
    InvalidKey(String),

    #[error("Request timed out after {0}ms")]
    Timeout(u64),

    #[error("Server responded with status {0}")]
    Status(u16),

    #[error("Transport error: {0}")]
    Transport(String),
}

impl StoreError {
    /// True for failures a retry might fix
    pub fn is_transient(&self) -> bool {
        match self {
            StoreError::Timeout(_) | StoreError::Transport(_) => true,
            StoreError::Status(code) => *code >= 500,
            StoreError::NotFound(_) | StoreError::InvalidKey(_) => false,
        }
    }
}

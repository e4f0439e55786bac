//! Error types for the editor

use pagecraft_dom::ParseError;
use pagecraft_store::StoreError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    #[error("Document surface is not ready")]
    Unavailable,

    #[error("Markup could not be parsed: {0}")]
    Parse(#[from] ParseError),
}

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Surface error: {0}")]
    Surface(#[from] SurfaceError),

    #[error("Mutation error: {0}")]
    Mutation(#[from] crate::mutations::MutationError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

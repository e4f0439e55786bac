//! # Pagecraft Store
//!
//! Persistence contract for edited pages. The editor core only ever talks to
//! a [`PageStore`]; where pages actually live is someone else's concern.
//!
//! - `load` returns the stored markup or [`StoreError::NotFound`]
//! - `save` overwrites (re-saving the same key never duplicates)
//! - `reset` drops every stored page
//!
//! [`HttpPageStore`] is native-only; browser hosts issue their own requests.

mod error;
#[cfg(not(target_arch = "wasm32"))]
mod http;
mod key;
mod memory;

pub use error::StoreError;
#[cfg(not(target_arch = "wasm32"))]
pub use http::{HttpPageStore, DEFAULT_TIMEOUT};
pub use key::PageKey;
pub use memory::MemoryPageStore;

use async_trait::async_trait;

#[async_trait]
pub trait PageStore: Send + Sync {
    /// Load the serialized document stored under `key`
    async fn load(&self, key: &PageKey) -> Result<String, StoreError>;

    /// Store `content` under `key`, replacing any previous content
    async fn save(&self, key: &PageKey, content: &str) -> Result<(), StoreError>;

    /// Clear all stored pages
    async fn reset(&self) -> Result<(), StoreError>;
}

use crate::{PageKey, PageStore, StoreError};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-process page store. Useful for tests and offline sessions.
#[derive(Debug, Default)]
pub struct MemoryPageStore {
    pages: RwLock<HashMap<PageKey, String>>,
}

impl MemoryPageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with pages
    pub fn with_pages(pages: impl IntoIterator<Item = (PageKey, String)>) -> Self {
        Self {
            pages: RwLock::new(pages.into_iter().collect()),
        }
    }

    pub async fn len(&self) -> usize {
        self.pages.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.pages.read().await.is_empty()
    }
}

#[async_trait]
impl PageStore for MemoryPageStore {
    async fn load(&self, key: &PageKey) -> Result<String, StoreError> {
        self.pages
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    async fn save(&self, key: &PageKey, content: &str) -> Result<(), StoreError> {
        self.pages
            .write()
            .await
            .insert(key.clone(), content.to_string());
        Ok(())
    }

    async fn reset(&self) -> Result<(), StoreError> {
        self.pages.write().await.clear();
        Ok(())
    }
}

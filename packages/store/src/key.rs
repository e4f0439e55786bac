use crate::StoreError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one stored page: a file-like page name, optionally scoped to
/// one user or session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageKey {
    page: String,
    owner: Option<String>,
}

impl PageKey {
    /// Validate and build a key. Page names must be plain file names.
    pub fn new(page: impl Into<String>) -> Result<Self, StoreError> {
        let page = page.into();
        validate_page_name(&page)?;
        Ok(Self { page, owner: None })
    }

    /// Scope the key to an owner (user or session id)
    pub fn owned_by(mut self, owner: impl Into<String>) -> Self {
        let owner = owner.into();
        self.owner = if owner.is_empty() { None } else { Some(owner) };
        self
    }

    pub fn page(&self) -> &str {
        &self.page
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }
}

impl fmt::Display for PageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.owner {
            Some(owner) => write!(f, "{}@{}", self.page, owner),
            None => f.write_str(&self.page),
        }
    }
}

fn validate_page_name(page: &str) -> Result<(), StoreError> {
    let invalid = page.is_empty()
        || page == "."
        || page.contains("..")
        || page.contains(['/', '\\', '\0', '?', '#']);
    if invalid {
        return Err(StoreError::InvalidKey(page.to_string()));
    }
    Ok(())
}

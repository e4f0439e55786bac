//! HTTP client for the page server.
//!
//! Wire protocol:
//!
//! | operation | request | success |
//! |---|---|---|
//! | load  | `GET {base}/template/{page}[?user={owner}]` | 200, HTML body (404 = not found) |
//! | save  | `POST {base}/update` `{"filename", "content", "userId"?}` | 200 |
//! | reset | `POST {base}/reset` | 200 |

use crate::{PageKey, PageStore, StoreError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateRequest<'a> {
    filename: &'a str,
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<&'a str>,
}

/// Page store backed by a remote page server
#[derive(Debug, Clone)]
pub struct HttpPageStore {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpPageStore {
    pub fn new(base_url: impl Into<String>) -> Result<Self, StoreError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn map_error(&self, err: reqwest::Error) -> StoreError {
        if err.is_timeout() {
            StoreError::Timeout(self.timeout.as_millis() as u64)
        } else if let Some(status) = err.status() {
            StoreError::Status(status.as_u16())
        } else {
            StoreError::Transport(err.to_string())
        }
    }

    async fn post_ok(&self, path: &str, body: Option<&UpdateRequest<'_>>) -> Result<(), StoreError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.post(&url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| self.map_error(e))?;
        let status = response.status();
        if !status.is_success() {
            warn!(url = %url, status = status.as_u16(), "Page server rejected request");
            return Err(StoreError::Status(status.as_u16()));
        }
        Ok(())
    }
}

#[async_trait]
impl PageStore for HttpPageStore {
    async fn load(&self, key: &PageKey) -> Result<String, StoreError> {
        let url = format!("{}/template/{}", self.base_url, key.page());
        debug!(url = %url, owner = ?key.owner(), "Loading page");

        let mut request = self.client.get(&url);
        if let Some(owner) = key.owner() {
            request = request.query(&[("user", owner)]);
        }

        let response = request.send().await.map_err(|e| self.map_error(e))?;
        match response.status() {
            StatusCode::NOT_FOUND => Err(StoreError::NotFound(key.to_string())),
            status if status.is_success() => {
                response.text().await.map_err(|e| self.map_error(e))
            }
            status => Err(StoreError::Status(status.as_u16())),
        }
    }

    async fn save(&self, key: &PageKey, content: &str) -> Result<(), StoreError> {
        debug!(page = %key, bytes = content.len(), "Saving page");
        let body = UpdateRequest {
            filename: key.page(),
            content,
            user_id: key.owner(),
        };
        self.post_ok("/update", Some(&body)).await
    }

    async fn reset(&self) -> Result<(), StoreError> {
        debug!(base = %self.base_url, "Resetting page store");
        self.post_ok("/reset", None).await
    }
}

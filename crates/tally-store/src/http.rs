//! Remote key-value document store.
//!
//! The document is stored under a single key of an HTTP key-value service:
//!
//! - `GET {base_url}/{key}` returns the JSON document (404: nothing stored yet)
//! - `PUT {base_url}/{key}` with a JSON body replaces it
//!
//! Requests carry `Authorization: Bearer <token>` when a token is configured.
//! The service has no compare-and-swap, so the revision check here is a
//! read-then-write and only narrows the lost-update window.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use std::time::Duration;
use tally_core::{AllData, HttpStoreConfig};

use crate::DocumentStore;
use crate::error::{StoreError, check_revision};

/// HTTP key-value backend.
#[derive(Debug)]
pub struct HttpStore {
    client: Client,
    document_url: String,
    token: Option<String>,
    seed_defaults: bool,
}

impl HttpStore {
    /// Create a store from configuration.
    pub fn new(config: &HttpStoreConfig, seed_defaults: bool) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self::with_client(
            client,
            &config.base_url,
            &config.key,
            config.token(),
            seed_defaults,
        ))
    }

    /// Create with a custom reqwest [`Client`].
    pub fn with_client(
        client: Client,
        base_url: &str,
        key: &str,
        token: Option<String>,
        seed_defaults: bool,
    ) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            client,
            document_url: format!("{base}/{key}"),
            token,
            seed_defaults,
        }
    }

    pub fn document_url(&self) -> &str {
        &self.document_url
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn fetch(&self) -> Result<Option<AllData>, StoreError> {
        let resp = self
            .authorize(self.client.get(&self.document_url))
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(StoreError::Unavailable(format!(
                "HTTP {} from {}",
                resp.status().as_u16(),
                self.document_url
            )));
        }

        let body = resp.text().await?;
        Ok(Some(serde_json::from_str(&body)?))
    }
}

#[async_trait]
impl DocumentStore for HttpStore {
    async fn load(&self) -> Result<AllData, StoreError> {
        match self.fetch().await? {
            Some(data) => Ok(data),
            None => {
                tracing::info!(url = %self.document_url, "No remote document yet, starting empty");
                Ok(if self.seed_defaults {
                    AllData::seeded()
                } else {
                    AllData::default()
                })
            }
        }
    }

    async fn save(&self, data: &AllData) -> Result<u64, StoreError> {
        let stored = self.fetch().await?.map(|d| d.revision).unwrap_or(0);
        check_revision(stored, data.revision)?;

        let next = AllData {
            revision: stored + 1,
            ..data.clone()
        };
        let resp = self
            .authorize(self.client.put(&self.document_url))
            .json(&next)
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(StoreError::Rejected(format!(
                "HTTP {} from {}",
                resp.status().as_u16(),
                self.document_url
            )));
        }

        tracing::debug!(url = %self.document_url, revision = next.revision, "Saved remote document");
        Ok(next.revision)
    }

    fn describe(&self) -> String {
        format!("http:{}", self.document_url)
    }
}

//! HTTP client for the remote progress service.

use async_trait::async_trait;
use reqwest::{header, Client as ReqwestClient};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::domain::errors::{SyncError, SyncResult};
use crate::domain::models::{ObjectiveRecord, RemoteConfig};
use crate::domain::ports::ObjectiveClient;

/// Configuration for the HTTP objective client
#[derive(Debug, Clone)]
pub struct HttpObjectiveClientConfig {
    /// Base URL of the objectives resource, e.g. `http://host/api/game/objectives`
    pub base_url: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for HttpObjectiveClientConfig {
    fn default() -> Self {
        RemoteConfig::default().into()
    }
}

impl From<RemoteConfig> for HttpObjectiveClientConfig {
    fn from(config: RemoteConfig) -> Self {
        Self {
            base_url: config.base_url,
            timeout_secs: config.request_timeout_secs,
        }
    }
}

/// Stateless accessor for the remote objectives API.
///
/// Endpoints:
/// - `GET {base}` - every objective
/// - `GET {base}/canvas/pipeline/progress/{bool}` - names filtered by completion
/// - `POST {base}/progress/{id}` - raw `"1"` / `"0"` body
pub struct HttpObjectiveClient {
    http_client: ReqwestClient,
    base_url: String,
}

impl HttpObjectiveClient {
    pub fn new(config: HttpObjectiveClientConfig) -> SyncResult<Self> {
        let http_client = ReqwestClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(4)
            .build()
            .map_err(|e| SyncError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> SyncResult<T> {
        let response = self.http_client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SyncError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Push a completion flag for a known remote id.
    #[instrument(skip(self))]
    pub async fn push_progress_by_id(&self, id: i64, completed: bool) -> SyncResult<()> {
        let response = self
            .http_client
            .post(format!("{}/progress/{id}", self.base_url))
            .header(header::CONTENT_TYPE, "application/json")
            .body(if completed { "1" } else { "0" })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SyncError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        debug!(id, completed, "progress pushed");
        Ok(())
    }
}

#[async_trait]
impl ObjectiveClient for HttpObjectiveClient {
    async fn fetch_all(&self) -> SyncResult<Vec<ObjectiveRecord>> {
        self.get_json(&self.base_url).await
    }

    async fn fetch_by_completion(&self, completed: bool) -> SyncResult<Vec<String>> {
        self.get_json(&format!(
            "{}/canvas/pipeline/progress/{completed}",
            self.base_url
        ))
        .await
    }

    /// The remote addresses progress by id, so the name is resolved through a
    /// fresh fetch-all first.
    async fn push_progress(&self, name: &str, completed: bool) -> SyncResult<()> {
        let objectives = self.fetch_all().await?;
        let id = objectives
            .iter()
            .find(|o| o.name.as_deref() == Some(name))
            .map(|o| o.id)
            .ok_or_else(|| SyncError::ObjectiveNotFound(name.to_string()))?;

        self.push_progress_by_id(id, completed).await
    }
}

//! Reqwest-backed implementation of [`EpicApi`].
//!
//! Routes, relative to the configured base URL:
//! - `POST /api/epics/{id}/spawn-next` -> `{ session?, error? }`
//! - `GET  /api/epics/{id}`            -> full queue state
//! - `POST /api/epics/{id}/stop`       -> empty body
//!
//! The client carries an explicit per-request timeout (the original design
//! left this to the transport; here expiry surfaces as
//! [`ClientError::Transport`], which the admission controller treats as a
//! recoverable round failure).

use std::time::Duration;

use super::{EpicApi, SpawnNextResponse, SpawnOutcome};
use crate::config::AppConfig;
use crate::error::ClientError;
use crate::queue::QueueState;

/// HTTP client bound to one epic.
#[derive(Clone, Debug)]
pub struct HttpEpicClient {
    http: reqwest::Client,
    base_url: String,
    epic_id: String,
}

impl HttpEpicClient {
    /// Build a client for `epic_id` against the configured backend.
    pub fn new(config: &AppConfig, epic_id: impl Into<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            epic_id: epic_id.into(),
        })
    }

    pub fn epic_id(&self) -> &str {
        &self.epic_id
    }

    fn epic_url(&self, suffix: &str) -> String {
        format!("{}/api/epics/{}{suffix}", self.base_url, self.epic_id)
    }

    /// Check the status, surfacing non-2xx as [`ClientError::Status`].
    fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(ClientError::Status { status })
        }
    }
}

impl EpicApi for HttpEpicClient {
    async fn spawn_next(&self) -> Result<Option<SpawnOutcome>, ClientError> {
        let response = self.http.post(self.epic_url("/spawn-next")).send().await?;
        let response = Self::check_status(response)?;
        let body: SpawnNextResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))?;
        Ok(body.into_outcome())
    }

    async fn refresh_state(&self) -> Result<QueueState, ClientError> {
        let response = self.http.get(self.epic_url("")).send().await?;
        let response = Self::check_status(response)?;
        response
            .json()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }

    async fn stop(&self) -> Result<(), ClientError> {
        let response = self.http.post(self.epic_url("/stop")).send().await?;
        Self::check_status(response)?;
        Ok(())
    }
}

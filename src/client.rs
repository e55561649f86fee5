use async_trait::async_trait;
use dotenv::dotenv;
use reqwest::{Client, StatusCode};
use std::env;
use thiserror::Error;
use tracing::{debug, info};

use crate::models::meeting::{ErrorResponse, Meeting};

const DEFAULT_BASE_URL: &str = "http://localhost:3000";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned {status}: {error}")]
    Status {
        status: u16,
        error: String,
        details: Option<String>,
    },
}

/// HTTP verb used to save a meeting: POST for a meeting this client just
/// created, PUT for one opened from a shared link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMethod {
    Post,
    Put,
}

/// The meeting API as seen from the scheduler view.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MeetingApi: Send + Sync {
    /// `Ok(None)` when the server has no such meeting.
    async fn fetch_meeting(&self, guid: &str) -> Result<Option<Meeting>, ClientError>;

    async fn save_meeting(
        &self,
        method: SaveMethod,
        guid: &str,
        meeting: &Meeting,
    ) -> Result<(), ClientError>;
}

/// reqwest client for the `/api/meeting/{id}` endpoints
pub struct MeetingClient {
    client: Client,
    base_url: String,
}

impl MeetingClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Create a client from `MEETING_API_BASE_URL`, defaulting to a local server
    pub fn from_env() -> Self {
        dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("MEETING_API_BASE_URL")
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self::new(base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn meeting_url(&self, guid: &str) -> String {
        format!("{}/api/meeting/{}", self.base_url, guid)
    }

    async fn status_error(res: reqwest::Response) -> ClientError {
        let status = res.status().as_u16();
        match res.json::<ErrorResponse>().await {
            Ok(body) => ClientError::Status {
                status,
                error: body.error,
                details: body.details,
            },
            Err(_) => ClientError::Status {
                status,
                error: "unexpected response".to_string(),
                details: None,
            },
        }
    }
}

#[async_trait]
impl MeetingApi for MeetingClient {
    async fn fetch_meeting(&self, guid: &str) -> Result<Option<Meeting>, ClientError> {
        let url = self.meeting_url(guid);
        debug!("API URL: {}", url);

        let res = self.client.get(&url).send().await?;
        info!("Response received with status: {}", res.status());

        if res.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !res.status().is_success() {
            return Err(Self::status_error(res).await);
        }

        Ok(Some(res.json::<Meeting>().await?))
    }

    async fn save_meeting(
        &self,
        method: SaveMethod,
        guid: &str,
        meeting: &Meeting,
    ) -> Result<(), ClientError> {
        let url = self.meeting_url(guid);
        debug!("Saving meeting via {:?} {}", method, url);

        let request = match method {
            SaveMethod::Post => self.client.post(&url),
            SaveMethod::Put => self.client.put(&url),
        };

        let res = request.json(meeting).send().await?;
        info!("Response received with status: {}", res.status());

        if !res.status().is_success() {
            return Err(Self::status_error(res).await);
        }
        Ok(())
    }
}

use std::time::Duration;

use serde::de::DeserializeOwned;
use url::Url;
use videojob_core::{JobResult, StatusSnapshot, TransportError, TransportFailure};
use videojob_logging::videojob_trace;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// Service root; the `/generate/video/...` paths are appended to it.
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Remote operations the poller needs from the generation service.
#[async_trait::async_trait]
pub trait StatusClient: Send + Sync {
    async fn fetch_status(&self, job_id: &str) -> Result<StatusSnapshot, TransportError>;

    /// Full result; only used when a completed snapshot lacks a playable video.
    async fn fetch_final_result(&self, job_id: &str) -> Result<JobResult, TransportError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestStatusClient {
    client: reqwest::Client,
    base_url: Url,
}

impl ReqwestStatusClient {
    pub fn new(settings: ClientSettings) -> Result<Self, TransportError> {
        let base_url = Url::parse(&settings.base_url)
            .map_err(|err| TransportError::new(TransportFailure::InvalidUrl, err.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(TransportError::new(
                TransportFailure::InvalidUrl,
                format!("{base_url} cannot be used as a base url"),
            ));
        }

        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| TransportError::new(TransportFailure::Network, err.to_string()))?;

        Ok(Self { client, base_url })
    }

    fn endpoint(&self, resource: &str, job_id: &str) -> Result<Url, TransportError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                TransportError::new(TransportFailure::InvalidUrl, "base url cannot carry a path")
            })?
            .pop_if_empty()
            .extend(["generate", "video", resource, job_id]);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, TransportError> {
        videojob_trace!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::new(
                TransportFailure::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let body = response.bytes().await.map_err(map_reqwest_error)?;
        serde_json::from_slice(&body)
            .map_err(|err| TransportError::new(TransportFailure::Decode, err.to_string()))
    }
}

#[async_trait::async_trait]
impl StatusClient for ReqwestStatusClient {
    async fn fetch_status(&self, job_id: &str) -> Result<StatusSnapshot, TransportError> {
        let url = self.endpoint("status", job_id)?;
        self.get_json(url).await
    }

    async fn fetch_final_result(&self, job_id: &str) -> Result<JobResult, TransportError> {
        let url = self.endpoint("result", job_id)?;
        self.get_json(url).await
    }
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        return TransportError::new(TransportFailure::Timeout, err.to_string());
    }
    if err.is_decode() {
        return TransportError::new(TransportFailure::Decode, err.to_string());
    }
    TransportError::new(TransportFailure::Network, err.to_string())
}

// src/api/mod.rs
// HTTP client for the OmniASR service

mod types;
mod upload;

pub use types::{
    ErrorBody, HealthResponse, JobState, JobStatusResponse, JobSubmitResponse, LanguageList,
    Segment, TranscriptionResult,
};
pub use upload::{percent, ByteProgress};

use crate::error::ClientError;
use crate::mode::TranscriptionMode;
use crate::validate::AudioPayload;
use reqwest::{multipart, Method, StatusCode};
use std::time::Duration;

/// Credential header attached to every request when configured.
pub const API_KEY_HEADER: &str = "X-API-Key";

const PROBE_TIMEOUT_SECS: u64 = 10;
const STATUS_TIMEOUT_SECS: u64 = 10;
const LANGUAGES_TIMEOUT_SECS: u64 = 15;
// Cold-start warmup on the serverless side can dominate latency, so the
// upload endpoints get a deliberately generous ceiling.
const TRANSCRIBE_TIMEOUT_SECS: u64 = 30 * 60;

pub struct ApiClient {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(address: &str, api_key: Option<String>) -> Result<Self, ClientError> {
        let base_url = normalize_base_url(address)?;
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ClientError::Connection(e.to_string()))?;

        tracing::info!("API client initialized for {}", base_url);

        Ok(Self {
            base_url,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self
            .client
            .request(method, format!("{}/{}", self.base_url, path));
        if let Some(key) = &self.api_key {
            builder = builder.header(API_KEY_HEADER, key);
        }
        builder
    }

    /// Liveness probe. Short timeout; failures classify as connection errors.
    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        let response = self
            .request(Method::GET, "health")
            .timeout(Duration::from_secs(PROBE_TIMEOUT_SECS))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ClientError::Connection("Health probe timed out".to_string())
                } else {
                    ClientError::Connection(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(ClientError::Connection(format!(
                "Health probe returned HTTP {}",
                response.status()
            )));
        }

        let health: HealthResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Connection(format!("Malformed health body: {}", e)))?;

        if !health.is_healthy() {
            return Err(ClientError::Connection(format!(
                "Service reported status '{}'",
                health.status
            )));
        }

        Ok(health)
    }

    /// Supported-language list with optional substring search and pagination.
    pub async fn languages(
        &self,
        search: Option<&str>,
        limit: u32,
        offset: u32,
    ) -> Result<LanguageList, ClientError> {
        let mut query: Vec<(&str, String)> =
            vec![("limit", limit.to_string()), ("offset", offset.to_string())];
        if let Some(s) = search.filter(|s| !s.trim().is_empty()) {
            query.push(("search", s.trim().to_string()));
        }

        let response = self
            .request(Method::GET, "languages")
            .query(&query)
            .timeout(Duration::from_secs(LANGUAGES_TIMEOUT_SECS))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(read_error(response).await);
        }

        response
            .json::<LanguageList>()
            .await
            .map_err(|e| ClientError::Network(format!("Malformed languages body: {}", e)))
    }

    /// Synchronous transcription against the mode-specific endpoint. The
    /// response body is the terminal result.
    pub async fn transcribe_sync(
        &self,
        payload: &AudioPayload,
        language: &str,
        mode: TranscriptionMode,
        on_upload: ByteProgress,
    ) -> Result<TranscriptionResult, ClientError> {
        tracing::info!(
            "Uploading '{}' ({:.1} MB) to /{} in {} mode",
            payload.file_name,
            payload.size() as f64 / (1024.0 * 1024.0),
            mode.endpoint(),
            match mode {
                TranscriptionMode::Standard => "standard",
                TranscriptionMode::Extended => "extended",
            }
        );

        let form = multipart::Form::new().part("file", upload::progress_part(payload, on_upload)?);

        let response = self
            .request(Method::POST, mode.endpoint())
            .query(&[("language", language)])
            .multipart(form)
            .timeout(Duration::from_secs(TRANSCRIBE_TIMEOUT_SECS))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(read_error(response).await);
        }

        response
            .json::<TranscriptionResult>()
            .await
            .map_err(|e| ClientError::Network(format!("Malformed transcription body: {}", e)))
    }

    /// Asynchronous submission. Returns the server-issued job handle data.
    pub async fn transcribe_async(
        &self,
        payload: &AudioPayload,
        language: &str,
        on_upload: ByteProgress,
    ) -> Result<JobSubmitResponse, ClientError> {
        tracing::info!(
            "Submitting '{}' ({:.1} MB) as an async job",
            payload.file_name,
            payload.size() as f64 / (1024.0 * 1024.0)
        );

        let form = multipart::Form::new().part("file", upload::progress_part(payload, on_upload)?);

        let response = self
            .request(Method::POST, "transcribe_async")
            .query(&[("language", language)])
            .multipart(form)
            .timeout(Duration::from_secs(TRANSCRIBE_TIMEOUT_SECS))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(read_error(response).await);
        }

        response
            .json::<JobSubmitResponse>()
            .await
            .map_err(|e| ClientError::Network(format!("Malformed submission body: {}", e)))
    }

    /// One status query for an async job. A 404 here is the definitive
    /// job-not-found signal that terminates polling.
    pub async fn job_status(&self, job_id: &str) -> Result<JobStatusResponse, ClientError> {
        let response = self
            .request(Method::GET, &format!("jobs/{}", job_id))
            .timeout(Duration::from_secs(STATUS_TIMEOUT_SECS))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ClientError::JobNotFound(job_id.to_string()));
        }

        if !response.status().is_success() {
            return Err(read_error(response).await);
        }

        response
            .json::<JobStatusResponse>()
            .await
            .map_err(|e| ClientError::Network(format!("Malformed job status body: {}", e)))
    }
}

/// Normalize a user-supplied base address: trim whitespace, require an HTTP
/// scheme, strip trailing slashes.
pub fn normalize_base_url(address: &str) -> Result<String, ClientError> {
    let trimmed = address.trim();
    if trimmed.is_empty() {
        return Err(ClientError::Validation(
            "Server address is required".to_string(),
        ));
    }

    if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
        return Err(ClientError::Validation(format!(
            "Server address must start with http:// or https:// (got '{}')",
            trimmed
        )));
    }

    Ok(trimmed.trim_end_matches('/').to_string())
}

/// Map a non-success response to the error taxonomy, preferring the server's
/// `{error, message, request_id}` body when one is present.
async fn read_error(response: reqwest::Response) -> ClientError {
    let status = response.status();
    let body = response.json::<ErrorBody>().await.ok();
    classify_status(status, body)
}

fn classify_status(status: StatusCode, body: Option<ErrorBody>) -> ClientError {
    let message = body
        .and_then(|b| b.message)
        .unwrap_or_else(|| format!("HTTP {}", status));

    match status.as_u16() {
        401 | 403 => ClientError::Auth,
        413 => ClientError::PayloadTooLarge(message),
        429 => ClientError::RateLimited,
        500..=599 => ClientError::Server {
            status: status.as_u16(),
            message,
        },
        _ => ClientError::Validation(message),
    }
}

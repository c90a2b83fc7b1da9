//! Transcription backend trait and AssemblyAI implementation.
//!
//! Job lifecycle: upload audio → submit a speaker-diarized transcription job
//! → poll status until `completed` or `error`. Polling is bounded by a
//! wall-clock budget; a job still running past it surfaces as
//! [`Error::Timeout`] rather than blocking forever.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use verbatim_core::defaults::{
    AAI_BASE_URL, ENV_AAI_API_KEY, ENV_AAI_BASE_URL, LANGUAGE_CODE, POLL_INTERVAL_SECS,
    POLL_TIMEOUT_SECS, PROVIDER_REQUEST_TIMEOUT_SECS,
};
use verbatim_core::{Error, Result, Utterance};

/// Result of a completed transcription job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TranscriptionResult {
    /// Provider-opaque job identifier.
    pub id: String,
    /// Full concatenated text, speaker-labeled one line per utterance.
    pub text: String,
    /// Ordered diarized utterances.
    pub utterances: Vec<Utterance>,
    /// Raw provider response for archival.
    pub raw: serde_json::Value,
}

/// Backend for transcribing audio.
#[async_trait]
pub trait TranscriptionBackend: Send + Sync {
    /// Transcribe audio bytes, requesting diarization in the configured
    /// language (overridable per call).
    async fn transcribe(
        &self,
        audio: &[u8],
        language: Option<&str>,
    ) -> Result<TranscriptionResult>;

    /// Check if the provider is reachable with the configured credentials.
    async fn health_check(&self) -> Result<bool>;

    /// Provider identifier for logging.
    fn provider_name(&self) -> &str;
}

/// Configuration for the AssemblyAI backend.
#[derive(Debug, Clone)]
pub struct AssemblyAiConfig {
    /// API base URL.
    pub base_url: String,
    /// Provider API key.
    pub api_key: String,
    /// Language requested for every job (ISO 639-1).
    pub language_code: String,
    /// Sleep between status polls.
    pub poll_interval: Duration,
    /// Wall-clock budget for a job before giving up.
    pub poll_timeout: Duration,
    /// Per-request HTTP timeout.
    pub request_timeout: Duration,
}

impl Default for AssemblyAiConfig {
    fn default() -> Self {
        Self {
            base_url: AAI_BASE_URL.to_string(),
            api_key: String::new(),
            language_code: LANGUAGE_CODE.to_string(),
            poll_interval: Duration::from_secs(POLL_INTERVAL_SECS),
            poll_timeout: Duration::from_secs(POLL_TIMEOUT_SECS),
            request_timeout: Duration::from_secs(PROVIDER_REQUEST_TIMEOUT_SECS),
        }
    }
}

fn env_duration_secs(name: &str) -> Option<Duration> {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .map(Duration::from_secs)
}

/// AssemblyAI transcription backend.
#[derive(Debug)]
pub struct AssemblyAiBackend {
    client: reqwest::Client,
    config: AssemblyAiConfig,
}

#[derive(Debug, Serialize)]
struct SubmitRequest<'a> {
    audio_url: &'a str,
    speaker_labels: bool,
    language_code: &'a str,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    upload_url: String,
}

#[derive(Debug, Deserialize)]
struct JobResponse {
    id: String,
    status: JobStatus,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    utterances: Option<Vec<Utterance>>,
    #[serde(default)]
    error: Option<String>,
}

/// Provider job states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
enum JobStatus {
    Queued,
    Processing,
    Completed,
    Error,
}

impl JobStatus {
    fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Error)
    }
}

impl AssemblyAiBackend {
    pub fn new(config: AssemblyAiConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(Error::Config(format!("{ENV_AAI_API_KEY} missing")));
        }

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Create from environment variables. Returns None when AAI_API_KEY is
    /// not set (the transcribe endpoints then degrade to a config error).
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var(ENV_AAI_API_KEY).ok()?;
        if api_key.is_empty() {
            return None;
        }
        let defaults = AssemblyAiConfig::default();
        let config = AssemblyAiConfig {
            base_url: std::env::var(ENV_AAI_BASE_URL).unwrap_or_else(|_| AAI_BASE_URL.to_string()),
            api_key,
            poll_interval: env_duration_secs("TRANSCRIBE_POLL_INTERVAL_SECS")
                .unwrap_or(defaults.poll_interval),
            poll_timeout: env_duration_secs("TRANSCRIBE_POLL_TIMEOUT_SECS")
                .unwrap_or(defaults.poll_timeout),
            ..defaults
        };
        Self::new(config).ok()
    }

    pub fn config(&self) -> &AssemblyAiConfig {
        &self.config
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), endpoint)
    }

    /// Upload raw audio bytes, returning the provider-hosted URL.
    async fn upload(&self, audio: &[u8]) -> Result<String> {
        let response = self
            .client
            .post(self.url("/v2/upload"))
            .header("authorization", &self.config.api_key)
            .header("content-type", "application/octet-stream")
            .body(audio.to_vec())
            .send()
            .await
            .map_err(|e| Error::Transcription(format!("Upload request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Transcription(format!(
                "Upload returned {status}: {body}"
            )));
        }

        let upload: UploadResponse = response
            .json()
            .await
            .map_err(|e| Error::Transcription(format!("Failed to parse upload response: {e}")))?;
        Ok(upload.upload_url)
    }

    /// Submit a diarized transcription job for an uploaded audio URL.
    async fn submit(&self, audio_url: &str, language: &str) -> Result<String> {
        let request = SubmitRequest {
            audio_url,
            speaker_labels: true,
            language_code: language,
        };

        let response = self
            .client
            .post(self.url("/v2/transcript"))
            .header("authorization", &self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Transcription(format!("Submit request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Transcription(format!(
                "Submit returned {status}: {body}"
            )));
        }

        let job: JobResponse = response
            .json()
            .await
            .map_err(|e| Error::Transcription(format!("Failed to parse submit response: {e}")))?;
        Ok(job.id)
    }

    /// Fetch the current job state as raw JSON (kept for archival).
    async fn fetch_job(&self, job_id: &str) -> Result<serde_json::Value> {
        let response = self
            .client
            .get(self.url(&format!("/v2/transcript/{job_id}")))
            .header("authorization", &self.config.api_key)
            .send()
            .await
            .map_err(|e| Error::Transcription(format!("Status request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Transcription(format!(
                "Status returned {status}: {body}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| Error::Transcription(format!("Failed to parse status response: {e}")))
    }

    /// Poll until the job reaches a terminal status or the budget expires.
    async fn wait_for_completion(&self, job_id: &str) -> Result<serde_json::Value> {
        let deadline = tokio::time::Instant::now() + self.config.poll_timeout;

        loop {
            let raw = self.fetch_job(job_id).await?;
            let job: JobResponse = serde_json::from_value(raw.clone())
                .map_err(|e| Error::Transcription(format!("Malformed job response: {e}")))?;

            if job.status.is_terminal() {
                if job.status == JobStatus::Error {
                    return Err(Error::Transcription(
                        job.error
                            .unwrap_or_else(|| "provider reported an error".to_string()),
                    ));
                }
                return Ok(raw);
            }

            debug!(
                subsystem = "inference",
                component = "assemblyai",
                job_id,
                status = ?job.status,
                "Transcription job still running"
            );

            if tokio::time::Instant::now() + self.config.poll_interval > deadline {
                warn!(
                    subsystem = "inference",
                    component = "assemblyai",
                    job_id,
                    timeout_secs = self.config.poll_timeout.as_secs(),
                    "Transcription job exceeded polling budget"
                );
                return Err(Error::Timeout(format!(
                    "transcription job {job_id} still running after {}s",
                    self.config.poll_timeout.as_secs()
                )));
            }
            tokio::time::sleep(self.config.poll_interval).await;
        }
    }
}

/// Build the speaker-labeled text form from a completed job.
///
/// Prefers the provider's concatenated `text`; falls back to joining the
/// utterances as `<speaker>: <text>` lines when the provider omits it.
fn result_from_raw(job_id: String, raw: serde_json::Value) -> Result<TranscriptionResult> {
    let job: JobResponse = serde_json::from_value(raw.clone())
        .map_err(|e| Error::Transcription(format!("Malformed job response: {e}")))?;

    let utterances = job.utterances.unwrap_or_default();
    let text = match job.text {
        Some(text) if !text.is_empty() => text,
        _ => utterances
            .iter()
            .map(|u| format!("{}: {}", u.speaker, u.text))
            .collect::<Vec<_>>()
            .join("\n"),
    };

    Ok(TranscriptionResult {
        id: job_id,
        text,
        utterances,
        raw,
    })
}

#[async_trait]
impl TranscriptionBackend for AssemblyAiBackend {
    async fn transcribe(
        &self,
        audio: &[u8],
        language: Option<&str>,
    ) -> Result<TranscriptionResult> {
        let language = language.unwrap_or(&self.config.language_code);

        info!(
            subsystem = "inference",
            component = "assemblyai",
            op = "transcribe",
            audio_bytes = audio.len(),
            language,
            "Submitting transcription job"
        );

        let audio_url = self.upload(audio).await?;
        let job_id = self.submit(&audio_url, language).await?;
        let raw = self.wait_for_completion(&job_id).await?;

        info!(
            subsystem = "inference",
            component = "assemblyai",
            op = "transcribe",
            job_id = %job_id,
            "Transcription job completed"
        );

        result_from_raw(job_id, raw)
    }

    async fn health_check(&self) -> Result<bool> {
        let response = self
            .client
            .get(self.url("/v2/transcript?limit=1"))
            .header("authorization", &self.config.api_key)
            .timeout(Duration::from_secs(5))
            .send()
            .await;

        match response {
            Ok(resp) => Ok(resp.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    fn provider_name(&self) -> &str {
        "assemblyai"
    }
}

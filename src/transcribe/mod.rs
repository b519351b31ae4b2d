use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{Duration, Instant};
use tokio::time::sleep;

use crate::extractor::AudioExtractor;
use crate::{Error, Result};

/// Response from uploading raw audio bytes
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    pub upload_url: String,
}

#[derive(Debug, Serialize)]
struct SubmitRequest<'a> {
    audio_url: &'a str,
    language_code: &'a str,
}

/// Response from submitting a transcription job
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitResponse {
    pub id: String,
}

/// Remote transcription job status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Processing,
    Completed,
    Error,
}

impl JobStatus {
    /// No further transition happens from a terminal status
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Error)
    }
}

/// One poll of a transcription job
#[derive(Debug, Clone, Deserialize)]
pub struct JobStatusResponse {
    pub status: JobStatus,
    pub text: Option<String>,
    pub error: Option<String>,
}

/// The three endpoints of the speech-to-text service
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpeechService: Send + Sync {
    /// Upload raw audio bytes, returning a service-side URL for them
    async fn upload(&self, audio: Vec<u8>) -> Result<UploadResponse>;

    /// Start a transcription job for previously uploaded audio
    async fn submit(&self, audio_url: &str, language_code: &str) -> Result<SubmitResponse>;

    /// Fetch the current status of a job
    async fn poll(&self, job_id: &str) -> Result<JobStatusResponse>;
}

/// Speech service speaking the AssemblyAI v2 HTTP API
pub struct HttpSpeechService {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpSpeechService {
    pub fn new(http: reqwest::Client, base_url: String, api_key: String) -> Self {
        Self {
            http,
            base_url,
            api_key,
        }
    }
}

#[async_trait]
impl SpeechService for HttpSpeechService {
    async fn upload(&self, audio: Vec<u8>) -> Result<UploadResponse> {
        let response = self
            .http
            .post(format!("{}/upload", self.base_url))
            .header("authorization", &self.api_key)
            .body(audio)
            .send()
            .await
            .map_err(|e| Error::Upload(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::Upload(format!(
                "HTTP {}",
                response.status().as_u16()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| Error::Upload(format!("malformed upload response: {}", e)))
    }

    async fn submit(&self, audio_url: &str, language_code: &str) -> Result<SubmitResponse> {
        let response = self
            .http
            .post(format!("{}/transcript", self.base_url))
            .header("authorization", &self.api_key)
            .json(&SubmitRequest {
                audio_url,
                language_code,
            })
            .send()
            .await
            .map_err(|e| Error::Submit(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::Submit(format!(
                "HTTP {}",
                response.status().as_u16()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| Error::Submit(format!("malformed submit response: {}", e)))
    }

    async fn poll(&self, job_id: &str) -> Result<JobStatusResponse> {
        let response = self
            .http
            .get(format!("{}/transcript/{}", self.base_url, job_id))
            .header("authorization", &self.api_key)
            .send()
            .await
            .map_err(|e| Error::Transcription(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::Transcription(format!(
                "HTTP {}",
                response.status().as_u16()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| Error::Transcription(format!("malformed status response: {}", e)))
    }
}

/// Produces a transcript for a video link
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, link: &str) -> Result<String>;
}

/// Transcription client: extracts audio, uploads it, runs a transcription
/// job to a terminal status, and always deletes the local audio file.
pub struct TranscriptionClient {
    extractor: Box<dyn AudioExtractor>,
    service: Box<dyn SpeechService>,
    language_code: String,
    poll_interval: Duration,
    max_poll_wait: Option<Duration>,
}

impl TranscriptionClient {
    pub fn new(
        extractor: Box<dyn AudioExtractor>,
        service: Box<dyn SpeechService>,
        language_code: String,
        poll_interval: Duration,
        max_poll_wait: Option<Duration>,
    ) -> Self {
        Self {
            extractor,
            service,
            language_code,
            poll_interval,
            max_poll_wait,
        }
    }

    /// Upload the audio file and run the remote job to completion
    async fn transcribe_file(&self, audio_path: &Path) -> Result<String> {
        let audio = fs_err::read(audio_path).map_err(|e| Error::Upload(e.to_string()))?;

        let uploaded = self.service.upload(audio).await?;
        tracing::debug!(url = %uploaded.upload_url, "audio uploaded");

        let job = self
            .service
            .submit(&uploaded.upload_url, &self.language_code)
            .await?;
        tracing::info!(job_id = %job.id, "transcription job started");

        let started = Instant::now();
        loop {
            let status = self.service.poll(&job.id).await?;

            match status.status {
                JobStatus::Completed => {
                    return status.text.ok_or_else(|| {
                        Error::Transcription("job completed without text".to_string())
                    });
                }
                JobStatus::Error => {
                    let detail = status
                        .error
                        .unwrap_or_else(|| "no error detail from service".to_string());
                    return Err(Error::Transcription(detail));
                }
                JobStatus::Queued | JobStatus::Processing => {
                    if let Some(max_wait) = self.max_poll_wait {
                        if started.elapsed() >= max_wait {
                            return Err(Error::TranscriptionTimeout(max_wait.as_secs()));
                        }
                    }

                    tracing::debug!(job_id = %job.id, status = ?status.status, "job still running");
                    sleep(self.poll_interval).await;
                }
            }
        }
    }

    /// Delete the audio file. Failures here are logged and never allowed to
    /// replace the transcription outcome.
    fn cleanup(audio_path: &Path) {
        if !audio_path.exists() {
            return;
        }

        match fs_err::remove_file(audio_path) {
            Ok(()) => tracing::debug!(path = %audio_path.display(), "removed audio file"),
            Err(e) => {
                tracing::warn!(path = %audio_path.display(), error = %e, "audio cleanup failed")
            }
        }
    }
}

#[async_trait]
impl Transcriber for TranscriptionClient {
    async fn transcribe(&self, link: &str) -> Result<String> {
        let artifact = self.extractor.extract_audio(link).await?;

        let result = self.transcribe_file(&artifact.path).await;

        // Mandatory regardless of what happened above
        Self::cleanup(&artifact.path);

        if let Err(e) = &result {
            tracing::error!(error = %e, "transcription failed");
        }

        result
    }
}

use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

use crate::utils::sanitize_filename;
use crate::{Error, Result};

/// Target format for extracted audio
pub const AUDIO_FORMAT: &str = "mp3";

/// Transcode quality passed to yt-dlp
const AUDIO_QUALITY: &str = "192K";

/// A transient local audio file produced by extraction.
///
/// Created here, consumed exactly once by the transcription client, which
/// also owns its deletion.
#[derive(Debug, Clone)]
pub struct AudioArtifact {
    pub path: PathBuf,
}

/// Trait for producing a local audio file from a video link
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AudioExtractor: Send + Sync {
    async fn extract_audio(&self, link: &str) -> Result<AudioArtifact>;
}

/// Audio extractor shelling out to yt-dlp
pub struct YtDlpExtractor {
    yt_dlp_path: String,
    media_dir: PathBuf,
}

impl YtDlpExtractor {
    pub fn new(media_dir: PathBuf) -> Self {
        Self {
            yt_dlp_path: "yt-dlp".to_string(),
            media_dir,
        }
    }

    /// Check if yt-dlp is available
    pub async fn check_availability(&self) -> bool {
        let output = Command::new(&self.yt_dlp_path)
            .arg("--version")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await;

        output.map(|o| o.status.success()).unwrap_or(false)
    }

    /// Get the video title using yt-dlp, for the artifact's filename
    async fn probe_title(&self, link: &str) -> Result<String> {
        tracing::debug!(%link, "probing video info");

        let output = Command::new(&self.yt_dlp_path)
            .args(["--dump-json", "--no-playlist", link])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| Error::Extraction(format!("failed to run yt-dlp: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Extraction(format!("yt-dlp failed: {}", stderr)));
        }

        let info: Value = serde_json::from_slice(&output.stdout)
            .map_err(|e| Error::Extraction(format!("unreadable yt-dlp output: {}", e)))?;

        info["title"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| Error::Extraction("video info has no title".to_string()))
    }
}

#[async_trait]
impl AudioExtractor for YtDlpExtractor {
    /// Download the best audio stream and transcode it to mp3 in the media
    /// directory, named after the video title. The file extension is fixed
    /// to mp3 no matter which container yt-dlp downloaded.
    async fn extract_audio(&self, link: &str) -> Result<AudioArtifact> {
        if !self.check_availability().await {
            return Err(Error::Extraction(
                "yt-dlp is not available. Please install it: https://github.com/yt-dlp/yt-dlp"
                    .to_string(),
            ));
        }

        fs_err::create_dir_all(&self.media_dir)
            .map_err(|e| Error::Extraction(format!("cannot create media dir: {}", e)))?;

        let title = self.probe_title(link).await?;
        let stem = sanitize_filename(&title);

        let output_template = self.media_dir.join(format!("{}.%(ext)s", stem));
        let audio_path = self.media_dir.join(format!("{}.{}", stem, AUDIO_FORMAT));

        tracing::info!(path = %audio_path.display(), "downloading audio");

        let output = Command::new(&self.yt_dlp_path)
            .args([
                "--output",
                &output_template.to_string_lossy(),
                "--format",
                "bestaudio/best",
                "--extract-audio",
                "--audio-format",
                AUDIO_FORMAT,
                "--audio-quality",
                AUDIO_QUALITY,
                "--no-playlist",
                link,
            ])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| Error::Extraction(format!("failed to run yt-dlp: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Extraction(format!(
                "audio download failed: {}",
                stderr
            )));
        }

        if !audio_path.exists() {
            return Err(Error::Extraction(format!(
                "yt-dlp reported success but {} is missing",
                audio_path.display()
            )));
        }

        Ok(AudioArtifact { path: audio_path })
    }
}

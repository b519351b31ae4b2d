use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Video metadata endpoint settings
    pub metadata: MetadataConfig,

    /// Speech-to-text service settings
    pub transcription: TranscriptionConfig,

    /// Text-generation service settings
    pub generation: GenerationConfig,

    /// Application settings
    pub app: AppConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataConfig {
    /// oEmbed endpoint used to resolve video titles (keyless)
    pub oembed_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionConfig {
    /// Base URL of the transcription service API
    pub base_url: String,

    /// API key sent in the authorization header
    pub api_key: String,

    /// Language code requested for transcription jobs
    pub language_code: String,

    /// Seconds between job status polls
    pub poll_interval_secs: u64,

    /// Give up waiting for a terminal job status after this many seconds.
    /// `None` polls forever.
    pub max_poll_wait_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Base URL of the text-generation service API
    pub base_url: String,

    /// API key sent as a bearer token
    pub api_key: String,

    /// Model identifier
    pub model: String,

    /// Maximum generated tokens
    pub max_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory for transient audio downloads
    pub media_dir: PathBuf,

    /// Path of the saved-articles store (platform data dir if unset)
    pub store_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            metadata: MetadataConfig {
                oembed_url: "https://www.youtube.com/oembed".to_string(),
            },
            transcription: TranscriptionConfig {
                base_url: "https://api.assemblyai.com/v2".to_string(),
                api_key: "".to_string(),
                language_code: "en".to_string(),
                poll_interval_secs: 3,
                max_poll_wait_secs: Some(1800),
            },
            generation: GenerationConfig {
                base_url: "https://api.cohere.com".to_string(),
                api_key: "".to_string(),
                model: "command-r-plus".to_string(),
                max_tokens: 1000,
                temperature: 0.7,
            },
            app: AppConfig {
                media_dir: PathBuf::from("media"),
                store_path: None,
            },
        }
    }
}

impl Config {
    /// Load configuration from file or create default
    pub async fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = fs_err::read_to_string(&config_path)
                .context("Failed to read config file")?;

            let config: Config = serde_yaml::from_str(&content)
                .context("Failed to parse config file")?;

            config.validate()?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save().await?;
            Ok(config)
        }
    }

    /// Save configuration to file
    pub async fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)
            .context("Failed to serialize config")?;

        fs_err::write(&config_path, content)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Get configuration file path
    fn config_path() -> Result<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?;

        Ok(config_dir.join("blogscribe").join("config.yaml"))
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        if self.transcription.api_key.is_empty() {
            anyhow::bail!("Transcription service API key must be configured");
        }

        if self.generation.api_key.is_empty() {
            anyhow::bail!("Generation service API key must be configured");
        }

        if self.transcription.poll_interval_secs == 0 {
            anyhow::bail!("Poll interval must be at least one second");
        }

        Ok(())
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  Metadata endpoint: {}", self.metadata.oembed_url);
        println!("  Transcription API: {}", self.transcription.base_url);
        println!("  Language: {}", self.transcription.language_code);
        println!("  Poll interval: {}s", self.transcription.poll_interval_secs);
        match self.transcription.max_poll_wait_secs {
            Some(secs) => println!("  Max poll wait: {}s", secs),
            None => println!("  Max poll wait: unbounded"),
        }
        println!("  Generation API: {}", self.generation.base_url);
        println!("  Model: {}", self.generation.model);
        println!("  Media dir: {}", self.app.media_dir.display());
    }
}

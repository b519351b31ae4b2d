//! Blogscribe - turn a video link into a written blog article
//!
//! This library resolves a video's title, extracts its audio with yt-dlp,
//! transcribes the audio through a speech-to-text service, and asks a
//! text-generation service to turn the transcript into a blog post, which
//! is then persisted for the requesting user.

pub mod api;
pub mod cli;
pub mod config;
pub mod extractor;
pub mod generate;
pub mod pipeline;
pub mod resolver;
pub mod store;
pub mod transcribe;
pub mod utils;

pub use cli::{Cli, Commands};
pub use config::Config;
pub use extractor::{AudioArtifact, AudioExtractor};
pub use pipeline::{BlogPipeline, Stage};
pub use store::{BlogRecord, BlogStore};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, Error>;

/// Stage-tagged failures of the generation pipeline
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("unrecognized video link: {0}")]
    InvalidLinkFormat(String),

    #[error("could not fetch video metadata: {0}")]
    MetadataFetch(String),

    #[error("audio extraction failed: {0}")]
    Extraction(String),

    #[error("audio upload failed: {0}")]
    Upload(String),

    #[error("transcription request failed: {0}")]
    Submit(String),

    #[error("transcription failed: {0}")]
    Transcription(String),

    #[error("transcription did not reach a terminal state within {0} seconds")]
    TranscriptionTimeout(u64),

    #[error("article generation failed: {0}")]
    Generation(String),

    #[error("could not persist blog article: {0}")]
    Persistence(String),
}

impl Error {
    /// Which pipeline stage this failure belongs to. The orchestrator only
    /// needs the stage to pick a user-facing message; the finer-grained
    /// variant stays available in logs.
    pub fn stage(&self) -> Stage {
        match self {
            Error::InvalidLinkFormat(_) | Error::MetadataFetch(_) => Stage::ResolveTitle,
            Error::Extraction(_)
            | Error::Upload(_)
            | Error::Submit(_)
            | Error::Transcription(_)
            | Error::TranscriptionTimeout(_) => Stage::Transcribe,
            Error::Generation(_) => Stage::GenerateArticle,
            Error::Persistence(_) => Stage::Persist,
        }
    }
}

use std::time::Duration;

use crate::config::Config;
use crate::extractor::YtDlpExtractor;
use crate::generate::{ArticleGenerator, GenerationClient};
use crate::resolver::{OembedTitleResolver, ResolveTitle};
use crate::store::{BlogRecord, BlogStore, JsonFileStore};
use crate::transcribe::{HttpSpeechService, TranscriptionClient, Transcriber};
use crate::Result;

/// The four stages of a pipeline run, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ResolveTitle,
    Transcribe,
    GenerateArticle,
    Persist,
}

impl Stage {
    /// Short human-readable message identifying the failed stage
    pub fn user_message(&self) -> &'static str {
        match self {
            Stage::ResolveTitle => "Could not fetch video title",
            Stage::Transcribe => "Failed to get transcript",
            Stage::GenerateArticle => "Failed to generate blog article",
            Stage::Persist => "Failed to save blog article",
        }
    }
}

/// Orchestrates one pipeline run: resolve -> transcribe -> generate -> persist.
///
/// Strictly linear and fail-fast: a stage failure terminates the run and
/// later stages never execute. The only rollback is the audio cleanup the
/// transcription client already owns.
pub struct BlogPipeline {
    resolver: Box<dyn ResolveTitle>,
    transcriber: Box<dyn Transcriber>,
    generator: Box<dyn ArticleGenerator>,
    store: Box<dyn BlogStore>,
}

impl BlogPipeline {
    pub fn new(
        resolver: Box<dyn ResolveTitle>,
        transcriber: Box<dyn Transcriber>,
        generator: Box<dyn ArticleGenerator>,
        store: Box<dyn BlogStore>,
    ) -> Self {
        Self {
            resolver,
            transcriber,
            generator,
            store,
        }
    }

    /// Wire up the real collaborators from configuration
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::new();

        let resolver = OembedTitleResolver::new(http.clone(), config.metadata.oembed_url.clone());

        let extractor = YtDlpExtractor::new(config.app.media_dir.clone());
        let service = HttpSpeechService::new(
            http.clone(),
            config.transcription.base_url.clone(),
            config.transcription.api_key.clone(),
        );
        let transcriber = TranscriptionClient::new(
            Box::new(extractor),
            Box::new(service),
            config.transcription.language_code.clone(),
            Duration::from_secs(config.transcription.poll_interval_secs),
            config.transcription.max_poll_wait_secs.map(Duration::from_secs),
        );

        let generator = GenerationClient::new(
            http,
            config.generation.base_url.clone(),
            config.generation.api_key.clone(),
            config.generation.model.clone(),
            config.generation.max_tokens,
            config.generation.temperature,
        );

        let store_path = crate::store::resolve_store_path(config)?;

        Ok(Self::new(
            Box::new(resolver),
            Box::new(transcriber),
            Box::new(generator),
            Box::new(JsonFileStore::new(store_path)),
        ))
    }

    /// Run the full pipeline for one link on behalf of `owner`
    pub async fn run(&self, link: &str, owner: &str) -> Result<BlogRecord> {
        tracing::info!(%link, %owner, "starting pipeline run");

        let title = self.resolver.resolve_title(link).await?;
        tracing::info!(%title, "fetched video title");

        let transcript = self.transcriber.transcribe(link).await?;
        tracing::info!(transcript_len = transcript.len(), "got transcript");

        let content = self.generator.generate_article(&transcript).await?;

        let record = BlogRecord::new(owner, &title, link, &content);
        self.store.save(&record).await?;

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::MockArticleGenerator;
    use crate::resolver::MockResolveTitle;
    use crate::store::MockBlogStore;
    use crate::transcribe::MockTranscriber;
    use crate::Error;

    fn mocks() -> (
        MockResolveTitle,
        MockTranscriber,
        MockArticleGenerator,
        MockBlogStore,
    ) {
        (
            MockResolveTitle::new(),
            MockTranscriber::new(),
            MockArticleGenerator::new(),
            MockBlogStore::new(),
        )
    }

    fn pipeline(
        resolver: MockResolveTitle,
        transcriber: MockTranscriber,
        generator: MockArticleGenerator,
        store: MockBlogStore,
    ) -> BlogPipeline {
        BlogPipeline::new(
            Box::new(resolver),
            Box::new(transcriber),
            Box::new(generator),
            Box::new(store),
        )
    }

    #[tokio::test]
    async fn full_run_persists_a_record() {
        let (mut resolver, mut transcriber, mut generator, mut store) = mocks();

        resolver
            .expect_resolve_title()
            .returning(|_| Ok("Demo Video".to_string()));
        transcriber
            .expect_transcribe()
            .returning(|_| Ok("hello world".to_string()));
        generator
            .expect_generate_article()
            .withf(|transcript| transcript == "hello world")
            .returning(|_| Ok("A blog about hello world".to_string()));
        store
            .expect_save()
            .withf(|record| {
                record.owner == "alice"
                    && record.source_title == "Demo Video"
                    && record.source_link == "https://youtu.be/abc123"
                    && record.content == "A blog about hello world"
            })
            .returning(|_| Ok(()));

        let pipeline = pipeline(resolver, transcriber, generator, store);
        let record = pipeline
            .run("https://youtu.be/abc123", "alice")
            .await
            .unwrap();

        assert_eq!(record.source_title, "Demo Video");
        assert_eq!(record.content, "A blog about hello world");
    }

    #[tokio::test]
    async fn title_failure_stops_the_run_before_transcription() {
        let (mut resolver, transcriber, generator, store) = mocks();

        resolver
            .expect_resolve_title()
            .returning(|_| Err(Error::MetadataFetch("HTTP 404".to_string())));
        // Mocks for the later stages carry no expectations: any call panics.

        let pipeline = pipeline(resolver, transcriber, generator, store);
        let err = pipeline
            .run("https://youtu.be/abc123", "alice")
            .await
            .unwrap_err();

        assert_eq!(err.stage(), Stage::ResolveTitle);
    }

    #[tokio::test]
    async fn transcript_failure_stops_the_run_before_generation() {
        let (mut resolver, mut transcriber, generator, store) = mocks();

        resolver
            .expect_resolve_title()
            .returning(|_| Ok("Demo Video".to_string()));
        transcriber
            .expect_transcribe()
            .returning(|_| Err(Error::Transcription("audio too noisy".to_string())));

        let pipeline = pipeline(resolver, transcriber, generator, store);
        let err = pipeline
            .run("https://youtu.be/abc123", "alice")
            .await
            .unwrap_err();

        assert_eq!(err.stage(), Stage::Transcribe);
    }

    #[tokio::test]
    async fn persistence_failure_is_stage_tagged() {
        let (mut resolver, mut transcriber, mut generator, mut store) = mocks();

        resolver
            .expect_resolve_title()
            .returning(|_| Ok("Demo Video".to_string()));
        transcriber
            .expect_transcribe()
            .returning(|_| Ok("hello world".to_string()));
        generator
            .expect_generate_article()
            .returning(|_| Ok("article".to_string()));
        store
            .expect_save()
            .returning(|_| Err(Error::Persistence("disk full".to_string())));

        let pipeline = pipeline(resolver, transcriber, generator, store);
        let err = pipeline
            .run("https://youtu.be/abc123", "alice")
            .await
            .unwrap_err();

        assert_eq!(err.stage(), Stage::Persist);
    }

    #[test]
    fn stage_messages_identify_the_stage() {
        assert_eq!(Stage::ResolveTitle.user_message(), "Could not fetch video title");
        assert_eq!(Stage::Transcribe.user_message(), "Failed to get transcript");
        assert_eq!(
            Stage::GenerateArticle.user_message(),
            "Failed to generate blog article"
        );
    }
}

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Build the generation prompt for a transcript
fn build_prompt(transcript: &str) -> String {
    format!(
        "Based on the following transcript from a YouTube video, write a comprehensive blog article:\n\n{}\n\nArticle:",
        transcript
    )
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    generations: Vec<Generation>,
}

#[derive(Debug, Deserialize)]
struct Generation {
    text: String,
}

/// Pull the article text out of a generation response. A missing or empty
/// generation list is a failure, not a silent empty article.
fn first_generation(response: GenerateResponse) -> Result<String> {
    response
        .generations
        .into_iter()
        .next()
        .map(|generation| generation.text.trim().to_string())
        .ok_or_else(|| Error::Generation("response carried no generations".to_string()))
}

/// Turns a transcript into article text
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ArticleGenerator: Send + Sync {
    async fn generate_article(&self, transcript: &str) -> Result<String>;
}

/// Article generator backed by a Cohere-style `/v2/generate` endpoint
pub struct GenerationClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl GenerationClient {
    pub fn new(
        http: reqwest::Client,
        base_url: String,
        api_key: String,
        model: String,
        max_tokens: u32,
        temperature: f32,
    ) -> Self {
        Self {
            http,
            base_url,
            api_key,
            model,
            max_tokens,
            temperature,
        }
    }
}

#[async_trait]
impl ArticleGenerator for GenerationClient {
    async fn generate_article(&self, transcript: &str) -> Result<String> {
        tracing::info!(transcript_len = transcript.len(), "generating blog article");

        let request = GenerateRequest {
            model: &self.model,
            prompt: build_prompt(transcript),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let response = self
            .http
            .post(format!("{}/v2/generate", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Generation(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::Generation(format!(
                "HTTP {}",
                response.status().as_u16()
            )));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::Generation(format!("malformed generation response: {}", e)))?;

        first_generation(body)
    }
}

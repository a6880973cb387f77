use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

use crate::config::ClientConfig;
use crate::models::FeedPost;

pub const OFFLINE_SUMMARY: &str = "AI services are currently offline.";
pub const FAILED_SUMMARY: &str = "Unable to generate AI summary at this moment.";
pub const SAFE: &str = "SAFE";

#[derive(Debug, Error)]
pub enum AiError {
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),
    #[error("no text in response")]
    Empty,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}
#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}
#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}
#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}
#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}
#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

/// Optional generative-text helper. Purely cosmetic: every failure degrades
/// to a fixed string and nothing is ever blocked on its answer.
#[derive(Clone)]
pub struct GenAiClient {
    http: reqwest::Client,
    api_key: Option<String>,
    model: String,
    base: String,
}

impl GenAiClient {
    pub fn new(api_key: Option<String>, model: impl Into<String>, base: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            model: model.into(),
            base: base.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(cfg: &ClientConfig) -> Self {
        Self::new(cfg.gemini_api_key.clone(), cfg.gemini_model.clone(), cfg.gemini_api_base.clone())
    }

    pub fn is_enabled(&self) -> bool { self.api_key.is_some() }

    async fn generate(&self, key: &str, prompt: &str) -> Result<String, AiError> {
        let url = format!("{}/v1beta/models/{}:generateContent", self.base, self.model);
        let req = GenerateRequest { contents: vec![Content { parts: vec![Part { text: prompt }] }] };
        let resp: GenerateResponse = self
            .http
            .post(url)
            .header("x-goog-api-key", key)
            .json(&req)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        let text: String = resp
            .candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .map(|p| p.text)
            .collect();
        if text.is_empty() { Err(AiError::Empty) } else { Ok(text) }
    }

    /// Two-sentence summary of trending topics. An empty string means the
    /// model answered with no text.
    pub async fn feed_summary(&self, posts: &[FeedPost]) -> String {
        let Some(key) = self.api_key.as_deref() else { return OFFLINE_SUMMARY.to_string() };
        let joined = posts.iter().map(|p| p.content.as_str()).collect::<Vec<_>>().join(" | ");
        let prompt = format!(
            "Here are some recent social media posts: {joined}.\n\
             Provide a concise 2-sentence summary of the current trending topics in this feed."
        );
        match self.generate(key, &prompt).await {
            Ok(text) => text,
            Err(AiError::Empty) => String::new(),
            Err(e) => {
                error!("feed summary failed: {e}");
                FAILED_SUMMARY.to_string()
            }
        }
    }

    /// `SAFE` or `REJECTED: reason`. Advisory only; failures read as `SAFE`.
    pub async fn moderate_content(&self, text: &str) -> String {
        let Some(key) = self.api_key.as_deref() else { return SAFE.to_string() };
        let prompt = format!(
            "Analyze if this text is appropriate for a social media platform: \"{text}\". \
             Reply with \"SAFE\" or \"REJECTED: [reason]\"."
        );
        match self.generate(key, &prompt).await {
            Ok(verdict) => verdict.trim().to_string(),
            Err(e) => {
                error!("moderation call failed: {e}");
                SAFE.to_string()
            }
        }
    }
}

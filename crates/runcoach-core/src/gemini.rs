//! Gemini completion bridge: prompt string in, generated text out.
//!
//! The bridge is deliberately thin — one `generateContent` call, no retry, no
//! streaming. A single failure is the orchestrator's signal to switch to
//! local fallback synthesis, so retrying here would only delay that.

use crate::config::CoachConfig;
use crate::error::CoachError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Text-completion seam between the orchestrator and the hosted LLM.
/// Production uses [`GeminiBridge`]; tests inject scripted implementations.
#[async_trait]
pub trait CompletionBridge: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, CoachError>;
}

// Gemini generateContent request/response (only the fields we touch).

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

/// Reqwest-backed Gemini client (`models/{model}:generateContent`).
pub struct GeminiBridge {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl GeminiBridge {
    /// Build from config. Errors when no API key is configured.
    pub fn from_config(config: &CoachConfig) -> Result<Self, CoachError> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(CoachError::MissingApiKey)?;
        Ok(Self::new(api_key, &config.model, &config.base_url))
    }

    pub fn new(api_key: &str, model: &str, base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            api_key: api_key.trim().to_string(),
            model: model.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }
}

#[async_trait]
impl CompletionBridge for GeminiBridge {
    async fn complete(&self, prompt: &str) -> Result<String, CoachError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.7,
                max_output_tokens: 1000,
            },
        };

        let res = self.client.post(&url).json(&body).send().await?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            let message = res.text().await.unwrap_or_default();
            return Err(CoachError::Bridge { status, message });
        }

        let parsed: GenerateResponse = res
            .json()
            .await
            .map_err(|e| CoachError::InvalidResponse(e.to_string()))?;

        let text = parsed
            .candidates
            .into_iter()
            .next()
            .map(|c| {
                c.content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .filter(|t| !t.is_empty())
            .ok_or_else(|| CoachError::InvalidResponse("empty candidate list".to_string()))?;

        Ok(text)
    }
}

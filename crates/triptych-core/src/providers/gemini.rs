//! Gemini generate-content adapter
//!
//! Unlike the OpenAI-compatible family, Gemini authenticates with a `key`
//! query parameter rather than an Authorization header.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::types::{
    require_key, status_error, Completion, ProviderError, ProviderId, ProviderSpec, TextProvider,
};

/// Adapter for `POST {base}/v1beta/models/{model}:generateContent`
pub struct GeminiAdapter {
    client: Client,
    spec: ProviderSpec,
}

impl GeminiAdapter {
    pub fn new(client: Client, spec: ProviderSpec) -> Self {
        Self { client, spec }
    }

    fn request_url(base_url: &str, model: &str, api_key: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            base_url, model, api_key
        )
    }

    /// Interpret a settled HTTP exchange into a completion or an error
    fn parse_response(raw: &str, status: StatusCode) -> Result<Completion, ProviderError> {
        if !status.is_success() {
            return Err(ProviderError::Status(status_error(raw, status)));
        }

        let parsed: GenerateResponse = serde_json::from_str(raw)
            .map_err(|_| ProviderError::Unparsable(status.as_u16()))?;

        // Text is the concatenation of the first candidate's text parts;
        // non-text parts contribute nothing.
        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<String>()
            })
            .unwrap_or_default();

        Ok(Completion {
            text,
            usage: parsed.usage_metadata,
        })
    }
}

#[async_trait]
impl TextProvider for GeminiAdapter {
    fn id(&self) -> ProviderId {
        self.spec.id
    }

    fn display_name(&self) -> &str {
        self.spec.id.display_name()
    }

    async fn generate(
        &self,
        api_key: Option<&str>,
        model: Option<&str>,
        prompt: &str,
    ) -> Result<Completion, ProviderError> {
        let api_key = require_key(api_key, &self.spec)?;
        let model = model.unwrap_or(&self.spec.default_model);
        let url = Self::request_url(&self.spec.base_url, model, api_key);

        let body = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig { temperature: 0.7 },
        };

        debug!(
            "{} request: model={}, prompt_len={}",
            self.display_name(),
            model,
            prompt.len()
        );

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(strip_url)?;

        let status = response.status();
        let raw = response.text().await.map_err(strip_url)?;

        Self::parse_response(&raw, status)
    }
}

/// The request URL carries the key; keep it out of transport errors
fn strip_url(err: reqwest::Error) -> ProviderError {
    ProviderError::Network(err.without_url())
}

// ── wire types ──

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(rename = "usageMetadata")]
    usage_metadata: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

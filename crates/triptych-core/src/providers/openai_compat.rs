//! OpenAI-compatible chat-completions adapter
//!
//! Shared by OpenAI and DeepSeek, which speak the same wire format and
//! differ only in base URL and default model.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::types::{
    require_key, status_error, Completion, ProviderError, ProviderId, ProviderSpec, TextProvider,
};

/// Adapter for any endpoint exposing `POST {base}/v1/chat/completions`
pub struct OpenAiCompatAdapter {
    client: Client,
    spec: ProviderSpec,
}

impl OpenAiCompatAdapter {
    pub fn new(client: Client, spec: ProviderSpec) -> Self {
        Self { client, spec }
    }

    /// Interpret a settled HTTP exchange into a completion or an error
    fn parse_response(raw: &str, status: StatusCode) -> Result<Completion, ProviderError> {
        if !status.is_success() {
            return Err(ProviderError::Status(status_error(raw, status)));
        }

        let parsed: ChatResponse = serde_json::from_str(raw)
            .map_err(|_| ProviderError::Unparsable(status.as_u16()))?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .unwrap_or_default();

        Ok(Completion {
            text,
            usage: parsed.usage,
        })
    }
}

#[async_trait]
impl TextProvider for OpenAiCompatAdapter {
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
        let url = format!("{}/v1/chat/completions", self.spec.base_url);

        let body = ChatRequest {
            model,
            messages: vec![ChatRequestMessage {
                role: "user",
                content: prompt,
            }],
            temperature: 0.7,
            stream: false,
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
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let raw = response.text().await?;

        Self::parse_response(&raw, status)
    }
}

// ── wire types ──

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatRequestMessage<'a>>,
    temperature: f32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatRequestMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    usage: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

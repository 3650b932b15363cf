//! Provider-agnostic types for the comparison fan-out

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Identifies one of the configured providers. Doubles as the response key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Openai,
    Deepseek,
    Gemini,
}

impl ProviderId {
    /// Human-readable label, used in timeout messages and logs
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Openai => "OpenAI",
            Self::Deepseek => "DeepSeek",
            Self::Gemini => "Gemini",
        }
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Openai => write!(f, "openai"),
            Self::Deepseek => write!(f, "deepseek"),
            Self::Gemini => write!(f, "gemini"),
        }
    }
}

/// Wire protocol a provider speaks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolKind {
    OpenAiCompatible,
    Gemini,
}

/// Static description of one provider endpoint.
///
/// Built once at startup and read-only afterwards; adapters are constructed
/// from these via [`build_adapter`](super::build_adapter).
#[derive(Debug, Clone)]
pub struct ProviderSpec {
    pub id: ProviderId,
    pub protocol: ProtocolKind,
    pub base_url: String,
    pub default_model: String,
    pub requires_key: bool,
}

impl ProviderSpec {
    /// The three shipped providers with their stock endpoints and models
    pub fn defaults() -> [ProviderSpec; 3] {
        [
            ProviderSpec {
                id: ProviderId::Openai,
                protocol: ProtocolKind::OpenAiCompatible,
                base_url: "https://api.openai.com".to_string(),
                default_model: "gpt-4o-mini".to_string(),
                requires_key: true,
            },
            ProviderSpec {
                id: ProviderId::Deepseek,
                protocol: ProtocolKind::OpenAiCompatible,
                base_url: "https://api.deepseek.com".to_string(),
                default_model: "deepseek-chat".to_string(),
                requires_key: true,
            },
            ProviderSpec {
                id: ProviderId::Gemini,
                protocol: ProtocolKind::Gemini,
                base_url: "https://generativelanguage.googleapis.com".to_string(),
                default_model: "gemini-1.5-flash".to_string(),
                requires_key: true,
            },
        ]
    }
}

/// Normalized result of one provider call
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    /// Generated text; empty when the provider returned none
    pub text: String,
    /// Provider-reported token usage, passed through verbatim
    pub usage: Option<Value>,
}

/// Errors a single provider call can produce.
///
/// Each is scoped to one provider branch; the orchestrator only ever
/// stringifies these into an [`Outcome`](crate::compare::Outcome).
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Missing API key")]
    MissingCredential,
    /// Non-2xx response; message comes from the provider body when parseable
    #[error("{0}")]
    Status(String),
    /// 2xx response whose body was not valid JSON
    #[error("Non-JSON response ({0})")]
    Unparsable(u16),
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
}

/// Trait all provider adapters implement.
///
/// One attempt per call, no internal retry; credentials arrive per request
/// and are never stored on the adapter.
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Stable identifier (the response key)
    fn id(&self) -> ProviderId;

    /// Label used in timeout messages (e.g. "OpenAI")
    fn display_name(&self) -> &str;

    /// Issue a single generation request
    async fn generate(
        &self,
        api_key: Option<&str>,
        model: Option<&str>,
        prompt: &str,
    ) -> Result<Completion, ProviderError>;
}

/// Reject absent or blank credentials before any network I/O
pub(crate) fn require_key<'a>(
    api_key: Option<&'a str>,
    spec: &ProviderSpec,
) -> Result<&'a str, ProviderError> {
    if !spec.requires_key {
        return Ok(api_key.unwrap_or_default());
    }
    match api_key {
        Some(key) if !key.trim().is_empty() => Ok(key),
        _ => Err(ProviderError::MissingCredential),
    }
}

/// Error message for a non-2xx response: the provider's own message when the
/// body parses to the common `{"error":{"message":...}}` shape, else the
/// bare status code.
pub(crate) fn status_error(body: &str, status: StatusCode) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: Option<ErrorDetail>,
    }
    #[derive(Deserialize)]
    struct ErrorDetail {
        message: Option<String>,
    }

    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .and_then(|e| e.message)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}

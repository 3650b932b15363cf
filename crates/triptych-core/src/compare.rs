//! Fan-out orchestrator: one prompt, every provider, every outcome kept
//!
//! All three provider calls are dispatched concurrently, each bounded by its
//! own deadline. A branch can only ever settle into an [`Outcome`]; no
//! provider failure, however shaped, escapes its own slot.

use std::time::{Duration, Instant};

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::deadline::{with_deadline, DEFAULT_DEADLINE};
use crate::providers::{build_adapter, Completion, ProviderSpec, TextProvider};

/// Caller-supplied overrides for one provider
#[derive(Debug, Clone, Default)]
pub struct CallOverrides {
    pub api_key: Option<String>,
    pub model: Option<String>,
}

/// Caller-supplied overrides for all three providers
#[derive(Debug, Clone, Default)]
pub struct CompareOverrides {
    pub openai: CallOverrides,
    pub deepseek: CallOverrides,
    pub gemini: CallOverrides,
}

/// Settled result of one provider branch.
///
/// Success carries `text` and `usage` (null when the provider reported
/// none); failure carries only `error`. Elapsed time is measured from
/// dispatch of the whole comparison and serialized as `ms`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(rename = "ms")]
    pub elapsed_ms: u64,
}

impl Outcome {
    fn success(completion: Completion, elapsed: Duration) -> Self {
        Self {
            ok: true,
            text: Some(completion.text),
            usage: Some(completion.usage.unwrap_or(Value::Null)),
            error: None,
            elapsed_ms: elapsed.as_millis() as u64,
        }
    }

    fn failure(message: String, elapsed: Duration) -> Self {
        Self {
            ok: false,
            text: None,
            usage: None,
            error: Some(message),
            elapsed_ms: elapsed.as_millis() as u64,
        }
    }
}

/// Aggregated response: exactly one outcome per provider, fixed order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub openai: Outcome,
    pub deepseek: Outcome,
    pub gemini: Outcome,
}

/// Top-level request rejection, raised before any provider is called
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompareError {
    #[error("Missing prompt")]
    MissingPrompt,
}

/// The fixed set of providers a comparison fans out to
pub struct ProviderSet {
    openai: Box<dyn TextProvider>,
    deepseek: Box<dyn TextProvider>,
    gemini: Box<dyn TextProvider>,
    deadline: Duration,
}

impl ProviderSet {
    /// Compose a set from three adapters, in response order
    pub fn new(
        openai: Box<dyn TextProvider>,
        deepseek: Box<dyn TextProvider>,
        gemini: Box<dyn TextProvider>,
    ) -> Self {
        Self {
            openai,
            deepseek,
            gemini,
            deadline: DEFAULT_DEADLINE,
        }
    }

    /// Build adapters for the given specs (in response order: openai,
    /// deepseek, gemini) over one shared HTTP client.
    pub fn from_specs(specs: [ProviderSpec; 3]) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .expect("Failed to build HTTP client");

        let [openai, deepseek, gemini] = specs;
        Self::new(
            build_adapter(client.clone(), openai),
            build_adapter(client.clone(), deepseek),
            build_adapter(client, gemini),
        )
    }

    /// Set the per-provider deadline
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Fan the prompt out to all three providers and collect every outcome.
    ///
    /// Fails only on a blank prompt, and does so before any provider is
    /// called. Wall-clock time is bounded by the slowest single deadline,
    /// not the sum of the three.
    pub async fn compare(
        &self,
        prompt: &str,
        overrides: &CompareOverrides,
    ) -> Result<Comparison, CompareError> {
        if prompt.trim().is_empty() {
            return Err(CompareError::MissingPrompt);
        }

        let started = Instant::now();
        let (openai, deepseek, gemini) = tokio::join!(
            self.branch(&*self.openai, &overrides.openai, prompt, started),
            self.branch(&*self.deepseek, &overrides.deepseek, prompt, started),
            self.branch(&*self.gemini, &overrides.gemini, prompt, started),
        );

        Ok(Comparison {
            openai,
            deepseek,
            gemini,
        })
    }

    /// Run one provider inside the deadline and settle into an Outcome
    async fn branch(
        &self,
        provider: &dyn TextProvider,
        overrides: &CallOverrides,
        prompt: &str,
        started: Instant,
    ) -> Outcome {
        let call = provider.generate(
            overrides.api_key.as_deref(),
            overrides.model.as_deref(),
            prompt,
        );

        match with_deadline(provider.display_name(), self.deadline, call).await {
            Ok(Ok(completion)) => Outcome::success(completion, started.elapsed()),
            Ok(Err(err)) => {
                let message = err.to_string();
                warn!("{} failed: {}", provider.display_name(), message);
                Outcome::failure(message, started.elapsed())
            }
            Err(timeout) => {
                let message = timeout.to_string();
                warn!("{}", message);
                Outcome::failure(message, started.elapsed())
            }
        }
    }
}

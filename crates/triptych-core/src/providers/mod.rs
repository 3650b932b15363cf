//! Provider adapters for the comparison fan-out
//!
//! Two wire protocols cover the three configured providers: OpenAI and
//! DeepSeek share the OpenAI-compatible chat-completions shape, while Gemini
//! speaks its own generate-content shape. Adapters implement [`TextProvider`]
//! and are chosen from [`ProviderSpec::protocol`] at startup.

pub mod gemini;
pub mod openai_compat;
pub mod types;

pub use gemini::GeminiAdapter;
pub use openai_compat::OpenAiCompatAdapter;
pub use types::{Completion, ProtocolKind, ProviderError, ProviderId, ProviderSpec, TextProvider};

use reqwest::Client;

/// Build the adapter for a provider from its static description
pub fn build_adapter(client: Client, spec: ProviderSpec) -> Box<dyn TextProvider> {
    match spec.protocol {
        ProtocolKind::OpenAiCompatible => Box::new(OpenAiCompatAdapter::new(client, spec)),
        ProtocolKind::Gemini => Box::new(GeminiAdapter::new(client, spec)),
    }
}

//! triptych-core — the fan-out comparison engine
//!
//! This crate provides:
//! - Provider adapters translating one generic request into each provider's
//!   wire protocol (OpenAI-compatible and Gemini)
//! - A deadline wrapper bounding how long any single provider is waited on
//! - The orchestrator that fans one prompt out to all providers concurrently
//!   and aggregates every outcome, success or failure, into one response

pub mod compare;
pub mod deadline;
pub mod providers;

// Re-export main types for convenience
pub use compare::{
    CallOverrides, CompareError, CompareOverrides, Comparison, Outcome, ProviderSet,
};
pub use deadline::{with_deadline, DeadlineExceeded, DEFAULT_DEADLINE};
pub use providers::{
    build_adapter, Completion, ProtocolKind, ProviderError, ProviderId, ProviderSpec, TextProvider,
};

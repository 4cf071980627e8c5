/// Chat-completion client module.
///
/// This module provides the blocking HTTP client used to talk to the Groq
/// (OpenAI-compatible) chat-completions API, plus the `CompletionClient` trait
/// that the extractor and unifier depend on.
mod client;

pub use client::{
    CompletionClient, DEFAULT_BASE_URL, DEFAULT_MODEL, GroqClient, GroqClientBuilder, LlmError,
};

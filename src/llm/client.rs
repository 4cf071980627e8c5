/// Groq chat-completions client implementation.
///
/// This module provides `GroqClient` for making synchronous HTTP requests to an
/// OpenAI-compatible chat-completions endpoint, along with error types and the
/// builder used to configure it.
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Default API root for Groq's OpenAI-compatible endpoints.
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Model used when neither the builder nor `GROQ_MODEL` names one.
pub const DEFAULT_MODEL: &str = "llama3-8b-8192";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors that can occur when requesting a completion.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Network-related errors (connection failures, DNS resolution, etc.)
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// Request or response timeout errors
    #[error("Request timed out")]
    Timeout(#[source] reqwest::Error),

    /// Non-success HTTP status, with whatever message the API returned
    #[error("HTTP error: status {status}: {message}")]
    Http { status: u16, message: String },

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The API answered, but not with a usable completion
    #[error("LLM API error: {message}")]
    Api { message: String },

    /// Invalid URL configuration error
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// No API key was configured
    #[error("Missing API key: set GROQ_API_KEY or pass one to the builder")]
    MissingApiKey,
}

impl LlmError {
    fn from_reqwest(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            LlmError::Timeout(error)
        } else {
            LlmError::Network(error)
        }
    }
}

/// A prompt-in, text-out completion capability.
///
/// Everything that talks to the model goes through this trait so the real
/// HTTP client can be swapped for a deterministic stub. Any
/// `Fn(&str) -> Result<String, LlmError>` closure implements it.
pub trait CompletionClient: Send + Sync {
    /// Sends `prompt` to the model and returns the raw completion text.
    fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}

impl<F> CompletionClient for F
where
    F: Fn(&str) -> Result<String, LlmError> + Send + Sync,
{
    fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        self(prompt)
    }
}

/// Builder for constructing `GroqClient` instances.
///
/// # Examples
///
/// ```
/// use posttag::llm::GroqClientBuilder;
///
/// let client = GroqClientBuilder::new()
///     .api_key("gsk_test")
///     .model("llama3-8b-8192")
///     .build()
///     .expect("Failed to create client");
/// assert_eq!(client.model(), "llama3-8b-8192");
/// ```
#[derive(Debug, Default)]
pub struct GroqClientBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    timeout: Option<Duration>,
}

impl GroqClientBuilder {
    /// Creates a new `GroqClientBuilder` with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key used as the bearer token.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the API root (e.g., "https://api.groq.com/openai/v1").
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the model identifier sent with every request.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Sets the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the `GroqClient` with the configured settings.
    ///
    /// # Environment Variables
    ///
    /// Each setting not given to the builder falls back to the environment,
    /// then to a default:
    ///
    /// - `GROQ_API_KEY`: required, no default
    /// - `GROQ_MODEL`: defaults to [`DEFAULT_MODEL`]
    /// - `GROQ_BASE_URL`: defaults to [`DEFAULT_BASE_URL`]
    ///
    /// # Errors
    ///
    /// Returns `LlmError::MissingApiKey` if no key is available, or
    /// `LlmError::InvalidUrl` if the base URL does not parse.
    pub fn build(self) -> Result<GroqClient, LlmError> {
        let api_key = self
            .api_key
            .or_else(|| env_non_empty("GROQ_API_KEY"))
            .ok_or(LlmError::MissingApiKey)?;

        let model = self
            .model
            .or_else(|| env_non_empty("GROQ_MODEL"))
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let base_url = self
            .base_url
            .or_else(|| env_non_empty("GROQ_BASE_URL"))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = base_url.trim_end_matches('/').to_string();

        reqwest::Url::parse(&base_url)
            .map_err(|e| LlmError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(LlmError::Network)?;

        Ok(GroqClient {
            client,
            api_key,
            base_url,
            model,
        })
    }
}

fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Synchronous client for an OpenAI-compatible chat-completions API.
///
/// Sends each prompt as a single user message and returns the content of the
/// first choice. There is no retry; a failed call is reported to the caller.
pub struct GroqClient {
    client: reqwest::blocking::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl std::fmt::Debug for GroqClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroqClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl GroqClient {
    /// Returns the base URL configured for this client.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the model identifier configured for this client.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

impl CompletionClient for GroqClient {
    fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let body = request_body(&self.model, prompt);
        debug!(model = %self.model, prompt_chars = prompt.chars().count(), "sending completion request");

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(LlmError::from_reqwest)?;

        let status = response.status();
        let text = response.text().map_err(LlmError::from_reqwest)?;

        if !status.is_success() {
            return Err(LlmError::Http {
                status: status.as_u16(),
                message: api_error_message(&text).unwrap_or(text),
            });
        }

        let json: Value = serde_json::from_str(&text).map_err(LlmError::Serialization)?;
        parse_completion(&json)
    }
}

/// Builds the chat-completions request body for a single user prompt.
fn request_body(model: &str, prompt: &str) -> Value {
    serde_json::json!({
        "model": model,
        "messages": [
            { "role": "user", "content": prompt }
        ],
        "stream": false
    })
}

/// Pulls `choices[0].message.content` out of a chat-completions response.
fn parse_completion(json: &Value) -> Result<String, LlmError> {
    if let Some(content) = json
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
    {
        return Ok(content.to_string());
    }

    let message = json
        .pointer("/error/message")
        .and_then(Value::as_str)
        .unwrap_or("Missing 'choices[0].message.content' in API response");

    Err(LlmError::Api {
        message: message.to_string(),
    })
}

fn api_error_message(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;
    json.pointer("/error/message")
        .and_then(Value::as_str)
        .map(str::to_string)
}

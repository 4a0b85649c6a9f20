/// LLM Client — the single point of entry for all text-generation calls.
///
/// ARCHITECTURAL RULE: No other module may talk to a provider API directly.
/// Generation and revision only see the `TextBackend` capability and pick one
/// of two slots in a `BackendPair`.
///
/// Providers: Groq (OpenAI-compatible chat completions) in the primary slot,
/// Google Gemini in the secondary slot.
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod gemini;
pub mod groq;

pub use gemini::GeminiBackend;
pub use groq::GroqBackend;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("No API key configured for {provider}")]
    MissingApiKey { provider: &'static str },
}

/// A text-generation service: prompt in, text out, may fail.
#[async_trait]
pub trait TextBackend: Send + Sync {
    /// Short provider/model label for logs.
    fn name(&self) -> &str;

    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}

/// Which of the two configured backends handles a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendSlot {
    Primary,
    Secondary,
}

impl BackendSlot {
    /// Even counter → primary, odd → secondary.
    pub fn from_parity(counter: usize) -> Self {
        if counter % 2 == 0 {
            BackendSlot::Primary
        } else {
            BackendSlot::Secondary
        }
    }

    pub fn other(self) -> Self {
        match self {
            BackendSlot::Primary => BackendSlot::Secondary,
            BackendSlot::Secondary => BackendSlot::Primary,
        }
    }
}

/// The two interchangeable backends calls are spread across.
#[derive(Clone)]
pub struct BackendPair {
    primary: Arc<dyn TextBackend>,
    secondary: Arc<dyn TextBackend>,
}

impl BackendPair {
    pub fn new(primary: Arc<dyn TextBackend>, secondary: Arc<dyn TextBackend>) -> Self {
        Self { primary, secondary }
    }

    pub fn get(&self, slot: BackendSlot) -> &dyn TextBackend {
        match slot {
            BackendSlot::Primary => self.primary.as_ref(),
            BackendSlot::Secondary => self.secondary.as_ref(),
        }
    }
}

/// Timeout and retry behaviour shared by every HTTP backend.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub timeout: Duration,
    /// Total attempts per call, including the first.
    pub max_retries: u32,
    /// First backoff delay; doubles on each further attempt.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(120),
            max_retries: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

/// Provider error bodies for both Groq and Gemini look like
/// `{"error": {"message": "..."}}`.
#[derive(Debug, Deserialize)]
struct ProviderError {
    error: ProviderErrorBody,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: String,
}

/// Shared reqwest client with retry/backoff. Each backend owns one.
#[derive(Clone)]
pub(crate) struct HttpTransport {
    client: Client,
    policy: RetryPolicy,
}

impl HttpTransport {
    pub(crate) fn new(policy: RetryPolicy) -> Result<Self, LlmError> {
        let client = Client::builder().timeout(policy.timeout).build()?;
        Ok(Self { client, policy })
    }

    /// Sends the request built by `build`, retrying on transport errors,
    /// 429 and 5xx with exponential backoff. Other 4xx fail immediately.
    pub(crate) async fn send_json<T, F>(&self, provider: &str, build: F) -> Result<T, LlmError>
    where
        T: DeserializeOwned,
        F: Fn(&Client) -> RequestBuilder,
    {
        let attempts = self.policy.max_retries.max(1);
        let mut last_error: Option<LlmError> = None;

        for attempt in 0..attempts {
            if attempt > 0 {
                let delay = self.policy.base_delay * (1u32 << (attempt - 1));
                warn!(
                    "{} call attempt {} failed, retrying after {}ms...",
                    provider,
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = match build(&self.client).send().await {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("{} API returned {}: {}", provider, status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ProviderError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let body = response.text().await?;
            debug!("{} call succeeded ({} bytes)", provider, body.len());
            return serde_json::from_str(&body).map_err(LlmError::Parse);
        }

        Err(last_error.unwrap_or(LlmError::RateLimited { retries: attempts }))
    }
}

/// Treats a blank completion as a failure rather than an empty section.
pub(crate) fn non_empty(text: Option<String>) -> Result<String, LlmError> {
    match text {
        Some(t) if !t.trim().is_empty() => Ok(t),
        _ => Err(LlmError::EmptyContent),
    }
}

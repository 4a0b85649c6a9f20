//! Groq backend — OpenAI-compatible chat completions.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{non_empty, HttpTransport, LlmError, RetryPolicy, TextBackend};

pub const DEFAULT_BASE_URL: &str = "https://api.groq.com";
pub const DEFAULT_MODEL: &str = "openai/gpt-oss-120b";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

pub struct GroqBackend {
    transport: HttpTransport,
    api_key: Option<String>,
    model: String,
    base_url: String,
    label: String,
}

impl GroqBackend {
    pub fn new(
        api_key: Option<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
        policy: RetryPolicy,
    ) -> Result<Self, LlmError> {
        let model = model.into();
        Ok(Self {
            transport: HttpTransport::new(policy)?,
            api_key,
            label: format!("groq/{model}"),
            model,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/openai/v1/chat/completions", self.base_url)
    }
}

#[async_trait]
impl TextBackend for GroqBackend {
    fn name(&self) -> &str {
        &self.label
    }

    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(LlmError::MissingApiKey { provider: "groq" })?;

        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };
        let url = self.endpoint();

        let response: ChatResponse = self
            .transport
            .send_json("groq", |client| {
                client.post(&url).bearer_auth(api_key).json(&body)
            })
            .await?;

        if let Some(usage) = &response.usage {
            debug!(
                "groq usage: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        non_empty(
            response
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.message.content),
        )
    }
}

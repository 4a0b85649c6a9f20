//! Google Gemini backend — `models/{model}:generateContent`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{non_empty, HttpTransport, LlmError, RetryPolicy, TextBackend};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
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

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

impl GenerateResponse {
    /// Concatenates the text parts of the first candidate.
    fn into_text(self) -> Option<String> {
        let parts = self.candidates.into_iter().next()?.content?.parts;
        let text: String = parts.into_iter().filter_map(|p| p.text).collect();
        Some(text)
    }
}

pub struct GeminiBackend {
    transport: HttpTransport,
    api_key: Option<String>,
    model: String,
    base_url: String,
    label: String,
}

impl GeminiBackend {
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
            label: format!("gemini/{model}"),
            model,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

#[async_trait]
impl TextBackend for GeminiBackend {
    fn name(&self) -> &str {
        &self.label
    }

    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(LlmError::MissingApiKey { provider: "gemini" })?;

        let body = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
        };
        let url = self.endpoint();

        let response: GenerateResponse = self
            .transport
            .send_json("gemini", |client| {
                client
                    .post(&url)
                    .header("x-goog-api-key", api_key)
                    .json(&body)
            })
            .await?;

        if let Some(usage) = &response.usage_metadata {
            debug!(
                "gemini usage: prompt_tokens={}, candidate_tokens={}",
                usage.prompt_token_count, usage.candidates_token_count
            );
        }

        non_empty(response.into_text())
    }
}

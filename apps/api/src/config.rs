use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::llm_client::{gemini, groq, RetryPolicy};

/// Application configuration loaded from environment variables.
///
/// Provider keys are optional here: a missing key only surfaces when a
/// generation or revision actually calls that provider.
#[derive(Debug, Clone)]
pub struct Config {
    pub groq_api_key: Option<String>,
    pub google_api_key: Option<String>,
    pub groq_model: String,
    pub gemini_model: String,
    pub groq_base_url: String,
    pub gemini_base_url: String,
    pub output_dir: PathBuf,
    pub llm_timeout_secs: u64,
    pub llm_max_retries: u32,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup. `from_env` passes the process env.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Config {
            groq_api_key: get("GROQ_API_KEY"),
            google_api_key: get("GOOGLE_API_KEY"),
            groq_model: get("GROQ_MODEL").unwrap_or_else(|| groq::DEFAULT_MODEL.to_string()),
            gemini_model: get("GEMINI_MODEL")
                .unwrap_or_else(|| gemini::DEFAULT_MODEL.to_string()),
            groq_base_url: get("GROQ_BASE_URL")
                .unwrap_or_else(|| groq::DEFAULT_BASE_URL.to_string()),
            gemini_base_url: get("GEMINI_BASE_URL")
                .unwrap_or_else(|| gemini::DEFAULT_BASE_URL.to_string()),
            output_dir: PathBuf::from(get("OUTPUT_DIR").unwrap_or_else(|| "output".to_string())),
            llm_timeout_secs: get("LLM_TIMEOUT_SECS")
                .unwrap_or_else(|| "120".to_string())
                .parse::<u64>()
                .context("LLM_TIMEOUT_SECS must be a whole number of seconds")?,
            llm_max_retries: get("LLM_MAX_RETRIES")
                .unwrap_or_else(|| "3".to_string())
                .parse::<u32>()
                .context("LLM_MAX_RETRIES must be a non-negative integer")?,
            port: get("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            timeout: Duration::from_secs(self.llm_timeout_secs),
            max_retries: self.llm_max_retries,
            ..RetryPolicy::default()
        }
    }
}

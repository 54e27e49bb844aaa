//! Text generation with bounded retry

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::ollama::OllamaClient;

/// Options for a single generation request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerateOptions {
    /// Sampling temperature, 0.0 is deterministic
    pub temperature: f32,
    /// Ask the backend to constrain output to a JSON document
    pub structured_output: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            structured_output: false,
        }
    }
}

impl GenerateOptions {
    /// Deterministic, JSON-constrained output
    pub fn structured() -> Self {
        Self {
            temperature: 0.0,
            structured_output: true,
        }
    }
}

/// Errors surfaced by a [`Generator`]
#[derive(Debug, Error)]
pub enum GenerateError {
    /// Every attempt failed; the backend gave up
    #[error("LLM call failed after {attempts} attempts: {last_error}")]
    GenerationFailed { attempts: u32, last_error: String },
}

/// Anything that turns a prompt into generated text
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &str, options: &GenerateOptions)
        -> Result<String, GenerateError>;
}

/// Retry policy for generation requests
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts including the first one
    pub max_attempts: u32,
    /// Delay before the first retry in milliseconds (doubles each retry)
    pub base_delay_ms: u64,
    /// Upper bound for a single delay in milliseconds
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1_000,
            max_delay_ms: 30_000,
        }
    }
}

impl RetryConfig {
    /// Delay to wait after the failed attempt `attempt` (0-based)
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let delay_ms = self
            .base_delay_ms
            .saturating_mul(2_u64.saturating_pow(attempt))
            .min(self.max_delay_ms);
        Duration::from_millis(delay_ms)
    }
}

/// [`Generator`] backed by an Ollama model
#[derive(Debug, Clone)]
pub struct OllamaGenerator {
    client: OllamaClient,
    model: String,
    retry: RetryConfig,
}

impl OllamaGenerator {
    pub fn new(client: OllamaClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            retry: RetryConfig::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn client(&self) -> &OllamaClient {
        &self.client
    }
}

#[async_trait]
impl Generator for OllamaGenerator {
    async fn generate(
        &self,
        prompt: &str,
        options: &GenerateOptions,
    ) -> Result<String, GenerateError> {
        let attempts = self.retry.max_attempts.max(1);
        let mut last_error = String::new();

        for attempt in 0..attempts {
            debug!(model = %self.model, attempt = attempt + 1, prompt_len = prompt.len(), "Sending generate request");

            match self
                .client
                .generate(
                    &self.model,
                    prompt,
                    options.temperature,
                    options.structured_output,
                )
                .await
            {
                Ok(text) => {
                    if attempt > 0 {
                        info!(model = %self.model, attempt = attempt + 1, "Generation recovered after retries");
                    }
                    return Ok(text);
                }
                Err(e) => {
                    last_error = format!("{:#}", e);

                    if attempt + 1 < attempts {
                        let delay = self.retry.backoff_delay(attempt);
                        warn!(
                            model = %self.model,
                            attempt = attempt + 1,
                            max_attempts = attempts,
                            delay_ms = delay.as_millis() as u64,
                            error = %last_error,
                            "Generation failed, retrying"
                        );
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        warn!(model = %self.model, attempts, error = %last_error, "Generation failed, giving up");
        Err(GenerateError::GenerationFailed {
            attempts,
            last_error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles() {
        let retry = RetryConfig::default();
        assert_eq!(retry.backoff_delay(0), Duration::from_secs(1));
        assert_eq!(retry.backoff_delay(1), Duration::from_secs(2));
        assert_eq!(retry.backoff_delay(2), Duration::from_secs(4));
    }

    #[test]
    fn test_backoff_capped() {
        let retry = RetryConfig {
            max_attempts: 10,
            base_delay_ms: 1_000,
            max_delay_ms: 5_000,
        };
        assert_eq!(retry.backoff_delay(3), Duration::from_secs(5));
        assert_eq!(retry.backoff_delay(40), Duration::from_secs(5));
    }

    #[test]
    fn test_structured_options() {
        let opts = GenerateOptions::structured();
        assert_eq!(opts.temperature, 0.0);
        assert!(opts.structured_output);
        assert!(!GenerateOptions::default().structured_output);
    }

    #[test]
    fn test_retry_config_partial_toml() {
        let retry: RetryConfig = toml::from_str("max_attempts = 5").unwrap();
        assert_eq!(retry.max_attempts, 5);
        assert_eq!(retry.base_delay_ms, 1_000);
    }

    #[tokio::test]
    async fn test_unreachable_backend_fails_after_all_attempts() {
        let client = OllamaClient::new("http://127.0.0.1:1").unwrap();
        let generator = OllamaGenerator::new(client, "llama3.2").with_retry(RetryConfig {
            max_attempts: 2,
            base_delay_ms: 0,
            max_delay_ms: 0,
        });

        let err = generator
            .generate("hello", &GenerateOptions::structured())
            .await
            .unwrap_err();

        let GenerateError::GenerationFailed { attempts, .. } = &err;
        assert_eq!(*attempts, 2);
        assert!(err.to_string().contains("failed after 2 attempts"));
    }
}

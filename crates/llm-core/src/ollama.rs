//! Ollama API client

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default request timeout; generation on a cold model can take a while
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Ollama service status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OllamaStatus {
    /// Service is running and ready
    Running,
    /// Service is stopped or unreachable
    Stopped,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'static str>,
    options: SamplingOptions,
}

#[derive(Debug, Serialize)]
struct SamplingOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Ollama API client
#[derive(Debug, Clone)]
pub struct OllamaClient {
    base_url: String,
    client: reqwest::Client,
}

impl OllamaClient {
    /// Create a new client with the default timeout
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a new client with a custom request timeout
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check if Ollama is running
    pub async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/api/tags", self.base_url);

        match self
            .client
            .get(&url)
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(resp) => Ok(resp.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    /// Get current status
    pub async fn status(&self) -> OllamaStatus {
        if self.health_check().await.unwrap_or(false) {
            OllamaStatus::Running
        } else {
            OllamaStatus::Stopped
        }
    }

    /// Run a single non-streaming generate request
    ///
    /// `json_format` asks Ollama to constrain the output to valid JSON. The
    /// returned text is trimmed.
    pub async fn generate(
        &self,
        model: &str,
        prompt: &str,
        temperature: f32,
        json_format: bool,
    ) -> Result<String> {
        let url = format!("{}/api/generate", self.base_url);

        let req = GenerateRequest {
            model,
            prompt,
            stream: false,
            format: json_format.then_some("json"),
            options: SamplingOptions { temperature },
        };

        let resp: GenerateResponse = self
            .client
            .post(&url)
            .json(&req)
            .send()
            .await
            .context("Failed to connect to Ollama")?
            .error_for_status()
            .context("Generate request failed")?
            .json()
            .await
            .context("Failed to parse generate response")?;

        Ok(resp.response.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_request_shape() {
        let req = GenerateRequest {
            model: "llama3.2",
            prompt: "hi",
            stream: false,
            format: Some("json"),
            options: SamplingOptions { temperature: 0.0 },
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["model"], "llama3.2");
        assert_eq!(value["stream"], false);
        assert_eq!(value["format"], "json");
        assert_eq!(value["options"]["temperature"], 0.0);
    }

    #[test]
    fn test_generate_request_omits_format() {
        let req = GenerateRequest {
            model: "m",
            prompt: "p",
            stream: false,
            format: None,
            options: SamplingOptions { temperature: 0.5 },
        };
        let value = serde_json::to_value(&req).unwrap();
        assert!(value.get("format").is_none());
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = OllamaClient::new("http://localhost:11434/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:11434");
    }

    #[tokio::test]
    async fn test_status_unreachable() {
        let client = OllamaClient::new("http://127.0.0.1:1").unwrap();
        assert_eq!(client.status().await, OllamaStatus::Stopped);
    }
}

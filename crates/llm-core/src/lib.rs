//! llm-core: Text generation for local LLMs
//!
//! Provides:
//! - Configuration loading (agent.toml)
//! - Ollama API client
//! - The `Generator` abstraction with retry and exponential backoff

pub mod config;
pub mod generate;
pub mod ollama;

pub use config::Config;
pub use generate::{GenerateError, GenerateOptions, Generator, OllamaGenerator, RetryConfig};
pub use ollama::{OllamaClient, OllamaStatus};

//! Generation Backend Abstraction
//!
//! Defines the [`GenerationBackend`] trait: submit a rendered prompt for a model
//! and get plain generated text back. Backends do no caching and no retries;
//! both belong to the caller.
//!
//! ## Backends
//!
//! - `openai`: OpenAI-compatible Chat Completions API
//! - `ollama`: local Ollama `/api/generate`

mod ollama;
mod openai;

pub use ollama::OllamaBackend;
pub use openai::OpenAiBackend;

// Re-export error types from centralized location
pub use crate::types::{ErrorCategory, ErrorClassifier, LlmError};

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::LlmConfig;
use crate::types::{AutodocError, Result};

/// Sampling options passed with every request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationOptions {
    /// Sequences that end generation
    pub stop_words: Vec<String>,
    pub repetition_penalty: f32,
}

impl GenerationOptions {
    pub fn new(stop_words: Vec<String>, repetition_penalty: f32) -> Self {
        Self {
            stop_words,
            repetition_penalty,
        }
    }
}

/// External text-generation backend
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Generate text for `prompt` with `model`
    async fn submit(&self, prompt: &str, model: &str, options: &GenerationOptions)
    -> Result<String>;

    /// Backend name for logging
    fn name(&self) -> &str;
}

/// Shared backend reference
pub type SharedBackend = Arc<dyn GenerationBackend>;

/// Create a shared backend from configuration
pub fn create_backend(config: &LlmConfig) -> Result<SharedBackend> {
    match config.provider.as_str() {
        "openai" => Ok(Arc::new(OpenAiBackend::new(config)?)),
        "ollama" => Ok(Arc::new(OllamaBackend::new(config)?)),
        _ => Err(AutodocError::Config(format!(
            "Unknown provider: {}. Supported: openai, ollama",
            config.provider
        ))),
    }
}

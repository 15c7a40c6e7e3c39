//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global (`~/.config/autodoc/config.toml`) and project (`autodoc.toml`)
//! level configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants::generation::{DEFAULT_CACHE_DIR, DEFAULT_REPETITION_PENALTY};
use crate::constants::project::DEFAULT_RULES_DIR;
use crate::types::{AutodocError, Result};

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Generation backend settings
    pub llm: LlmConfig,

    /// Response cache settings
    pub cache: CacheConfig,

    /// Project rule files
    pub rules: RulesConfig,

    /// Repository clone settings
    pub workdir: WorkdirConfig,

    /// Pull request publishing
    pub github: GithubConfig,

    /// Vector indexing of sources and summaries
    pub embeddings: EmbeddingsConfig,
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `AutodocError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(AutodocError::Config(format!(
                "LLM temperature must be between 0.0 and 2.0, got {}",
                self.llm.temperature
            )));
        }

        if self.llm.timeout_secs == 0 {
            return Err(AutodocError::Config(
                "LLM timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.llm.model.trim().is_empty() {
            return Err(AutodocError::Config("LLM model must not be empty".to_string()));
        }

        if self.llm.repetition_penalty < 0.0 {
            return Err(AutodocError::Config(format!(
                "LLM repetition_penalty must not be negative, got {}",
                self.llm.repetition_penalty
            )));
        }

        if self.cache.path.as_os_str().is_empty() {
            return Err(AutodocError::Config("cache path must not be empty".to_string()));
        }

        Ok(())
    }
}

// =============================================================================
// LLM Configuration
// =============================================================================

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name: "openai" or "ollama"
    pub provider: String,

    /// Model identifier, also part of every cache key
    pub model: String,

    /// API base URL (for custom endpoints)
    pub api_base: Option<String>,

    /// API key; never serialized to output
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    pub temperature: f32,

    /// Penalty for repeated tokens
    pub repetition_penalty: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            model: "llama3.1:8b".to_string(),
            api_base: None,
            api_key: None,
            timeout_secs: 600,
            temperature: 0.0,
            repetition_penalty: DEFAULT_REPETITION_PENALTY,
        }
    }
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("timeout_secs", &self.timeout_secs)
            .field("temperature", &self.temperature)
            .field("repetition_penalty", &self.repetition_penalty)
            .finish()
    }
}

// =============================================================================
// Cache / Rules / Workdir
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Directory holding one file per cache key
    pub path: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_CACHE_DIR),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Directory of `*.toml` rule files; built-in rules are used when missing
    pub dir: PathBuf,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_RULES_DIR),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkdirConfig {
    /// Root under which `temp/{owner}/{repo}/{branch}` clones live
    pub root: PathBuf,

    /// Keep clones after the run instead of removing them
    pub keep: bool,
}

impl Default for WorkdirConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            keep: false,
        }
    }
}

// =============================================================================
// GitHub Configuration
// =============================================================================

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubConfig {
    pub username: Option<String>,

    /// Access token; never serialized to output
    #[serde(skip_serializing)]
    pub token: Option<String>,

    /// REST API base URL
    pub api_base: String,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            username: None,
            token: None,
            api_base: "https://api.github.com".to_string(),
        }
    }
}

impl std::fmt::Debug for GithubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubConfig")
            .field("username", &self.username)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base)
            .finish()
    }
}

// =============================================================================
// Embeddings Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingsConfig {
    /// Forward sources and summaries to the vector store
    pub enabled: bool,

    /// Query used for the post-run similarity self check
    pub sim_search_test_prompt: String,
}

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            sim_search_test_prompt: "How is the project configured?".to_string(),
        }
    }
}

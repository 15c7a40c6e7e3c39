use tracing::debug;

use super::cache::{ResponseCache, cache_key};
use super::provider::{GenerationOptions, SharedBackend};
use super::response::clean_response;
use crate::types::Result;

/// How the generator uses the response cache
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CachePolicy {
    /// Skip cache reads but still write fresh responses
    pub overwrite: bool,
    /// Neither read nor write the cache
    pub ignore: bool,
}

impl CachePolicy {
    fn reads(&self) -> bool {
        !(self.overwrite || self.ignore)
    }

    fn writes(&self) -> bool {
        !self.ignore
    }
}

/// Generation client that consults the content-addressable cache before
/// calling the backend.
///
/// Responses are cleaned (reasoning blocks, stop-word suffixes, whitespace)
/// before they are cached and returned. An empty string is a valid result the
/// caller's fallback policy handles.
pub struct CachedGenerator {
    backend: SharedBackend,
    cache: ResponseCache,
    model: String,
    options: GenerationOptions,
    policy: CachePolicy,
}

impl CachedGenerator {
    pub fn new(backend: SharedBackend, cache: ResponseCache, model: impl Into<String>) -> Self {
        Self {
            backend,
            cache,
            model: model.into(),
            options: GenerationOptions::default(),
            policy: CachePolicy::default(),
        }
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_policy(mut self, policy: CachePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn options(&self) -> &GenerationOptions {
        &self.options
    }

    /// Generate text for a fully rendered prompt
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let key = cache_key(prompt, &self.model);

        if self.policy.reads()
            && let Some(cached) = self.cache.load(&key).await?
            && !cached.is_empty()
        {
            return Ok(cached);
        }

        debug!(
            backend = self.backend.name(),
            model = %self.model,
            key = %key,
            "Cache miss, calling backend"
        );
        let raw = self
            .backend
            .submit(prompt, &self.model, &self.options)
            .await?;
        let response = clean_response(&raw, &self.options.stop_words);

        if self.policy.writes() {
            self.cache.save(&key, &response).await?;
        }
        Ok(response)
    }
}

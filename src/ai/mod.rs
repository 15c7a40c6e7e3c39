//! Cached Generation
//!
//! - `provider`: generation backends (OpenAI-compatible, Ollama)
//! - `cache`: content-addressable response cache
//! - `response`: reasoning-block and stop-word cleanup
//! - `client`: cache-first generation client

pub mod cache;
pub mod client;
pub mod provider;
pub mod response;

pub use cache::{ResponseCache, cache_key};
pub use client::{CachePolicy, CachedGenerator};
pub use provider::{GenerationBackend, GenerationOptions, SharedBackend, create_backend};

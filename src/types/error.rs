//! Unified Error Type System
//!
//! Centralized error types for the whole run: repository synchronization,
//! project classification, cached generation, indexing and publishing.
//!
//! ## Error Kinds
//!
//! - **InvalidInput**: malformed URL, missing config, unimplemented match mode
//! - **ClassificationAmbiguous**: zero or unresolved rule matches
//! - **SyncFailure**: clone/fetch/checkout/pull, wrapped with the operation name
//! - **GenerationFailure**: backend error (never retried internally)
//! - **CacheIoFailure**: any cache error besides "not found"
//! - **IndexingFailure**: vector store error
//!
//! Every kind aborts the current run.

use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// Error Categories
// =============================================================================

/// Backend error categories, used to make generation failures readable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Rate limited by the backend
    RateLimit,
    /// Context/token limit exceeded
    TokenLimit,
    /// Authentication failed
    Auth,
    /// Network/connectivity issues
    Network,
    /// Backend unavailable
    Unavailable,
    /// Invalid request
    BadRequest,
    /// Malformed backend response
    ParseError,
    /// Unknown error
    Unknown,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RateLimit => write!(f, "RATE_LIMIT"),
            Self::TokenLimit => write!(f, "TOKEN_LIMIT"),
            Self::Auth => write!(f, "AUTH"),
            Self::Network => write!(f, "NETWORK"),
            Self::Unavailable => write!(f, "UNAVAILABLE"),
            Self::BadRequest => write!(f, "BAD_REQUEST"),
            Self::ParseError => write!(f, "PARSE_ERROR"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// =============================================================================
// LLM Error
// =============================================================================

/// Generation backend error with category and provider context
#[derive(Debug, Clone)]
pub struct LlmError {
    pub category: ErrorCategory,
    pub message: String,
    pub provider: Option<String>,
}

impl std::fmt::Display for LlmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(provider) = &self.provider {
            write!(f, "[{}:{}] {}", provider, self.category, self.message)
        } else {
            write!(f, "[{}] {}", self.category, self.message)
        }
    }
}

impl std::error::Error for LlmError {}

impl LlmError {
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            provider: None,
        }
    }

    pub fn with_provider(
        category: ErrorCategory,
        message: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            category,
            message: message.into(),
            provider: Some(provider.into()),
        }
    }
}

// =============================================================================
// Error Classifier
// =============================================================================

/// Maps backend HTTP statuses and messages onto [`ErrorCategory`]
pub struct ErrorClassifier;

impl ErrorClassifier {
    /// Classify an HTTP status code returned by a generation backend
    pub fn classify_http_status(status: u16, message: &str, provider: &str) -> LlmError {
        let category = match status {
            429 => ErrorCategory::RateLimit,
            401 | 403 => ErrorCategory::Auth,
            400 | 422 => ErrorCategory::BadRequest,
            413 => ErrorCategory::TokenLimit,
            404 | 500 | 502 | 503 | 504 => ErrorCategory::Unavailable,
            _ => ErrorCategory::Unknown,
        };
        LlmError::with_provider(category, message, provider)
    }

    /// Classify a transport-level reqwest failure
    pub fn classify_transport(err: &reqwest::Error, provider: &str) -> LlmError {
        let category = if err.is_timeout() || err.is_connect() {
            ErrorCategory::Network
        } else if err.is_decode() {
            ErrorCategory::ParseError
        } else {
            ErrorCategory::Unknown
        };
        LlmError::with_provider(category, err.to_string(), provider)
    }
}

// =============================================================================
// Error Kinds
// =============================================================================

/// Coarse error taxonomy shared by every component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    ClassificationAmbiguous,
    SyncFailure,
    GenerationFailure,
    CacheIoFailure,
    IndexingFailure,
    PublishFailure,
    Io,
}

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum AutodocError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    // -------------------------------------------------------------------------
    // Input / Classification
    // -------------------------------------------------------------------------
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Parse error in {path}: {message}")]
    Parse { path: String, message: String },

    #[error("Project classification failed: {0}")]
    ClassificationAmbiguous(String),

    // -------------------------------------------------------------------------
    // Workdir
    // -------------------------------------------------------------------------
    #[error("git {operation} failed: {message}")]
    SyncFailure { operation: String, message: String },

    // -------------------------------------------------------------------------
    // Generation
    // -------------------------------------------------------------------------
    #[error("Generation failed: {0}")]
    Generation(LlmError),

    #[error("Cache error for {}: {source}", path.display())]
    CacheIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // -------------------------------------------------------------------------
    // Collaborators
    // -------------------------------------------------------------------------
    #[error("Indexing failed: {0}")]
    Indexing(String),

    #[error("Publishing failed: {0}")]
    Publish(String),
}

impl From<LlmError> for AutodocError {
    fn from(err: LlmError) -> Self {
        AutodocError::Generation(err)
    }
}

pub type Result<T> = std::result::Result<T, AutodocError>;

impl AutodocError {
    /// Create a sync failure naming the git operation that failed
    pub fn sync(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SyncFailure {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create a generation failure from a plain message
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation(LlmError::new(ErrorCategory::Unknown, message))
    }

    /// Taxonomy bucket of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) | Self::Config(_) | Self::Parse { .. } | Self::Toml(_) => {
                ErrorKind::InvalidInput
            }
            Self::ClassificationAmbiguous(_) => ErrorKind::ClassificationAmbiguous,
            Self::SyncFailure { .. } => ErrorKind::SyncFailure,
            Self::Generation(_) | Self::Json(_) => ErrorKind::GenerationFailure,
            Self::CacheIo { .. } => ErrorKind::CacheIoFailure,
            Self::Indexing(_) => ErrorKind::IndexingFailure,
            Self::Publish(_) => ErrorKind::PublishFailure,
            Self::Io(_) => ErrorKind::Io,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

pub mod error;

pub use error::{AutodocError, ErrorCategory, ErrorClassifier, ErrorKind, LlmError, Result};

//! Source Tree Analysis
//!
//! - Ignore-aware directory walking
//! - Package symbol extraction for symbol-based grouping

pub mod parser;
pub mod scanner;

pub use parser::{SymbolExtractor, SymbolRegistry};
pub use scanner::IgnoreWalker;

//! Documentation Pipeline
//!
//! - `runner`: per-package generation with fallback prompts and README output
//! - `render`: prompt and artifact rendering
//! - `stats`: fallback and empty-response bookkeeping
//! - `session`: end-to-end run from source location to pull request
//!
//! ## Per-Package Flow
//!
//! ```text
//! files ──► code prompt ──► CachedGenerator ──► [fallback] ──► file summaries
//!                                                                  │
//! dir listing + summaries ──► package prompt ──► [fallback] ──► README.md / README_GENERATED.md
//! ```

pub mod render;
pub mod runner;
pub mod session;
pub mod stats;

pub use runner::{PackageRunner, parse_package_list};
pub use session::{RunArtifacts, RunRequest, Session, similarity_check};
pub use stats::RunStats;

//! autodoc - LLM-Driven Package Documentation
//!
//! Locates a repository (local directory or remote URL), classifies its project
//! type through declarative rules, groups files into packages and asks a text
//! generation backend for per-file and per-package summaries. Results land in
//! each package directory as `README.md` (or `README_GENERATED.md`), and can be
//! published as a pull request from an `{branch}_autodoc` branch.
//!
//! ## Quick Start
//!
//! ```ignore
//! use autodoc::{Config, FirstMatch, RunRequest, Session, SourceLocation};
//!
//! let session = Session::new(Config::default())?;
//! let request = RunRequest::new(SourceLocation::local("."));
//! let artifacts = session
//!     .run(&request, &mut FirstMatch, &mut std::io::stdout())
//!     .await?;
//! ```
//!
//! ## Modules
//!
//! - [`workdir`]: repository clone/fetch state machine and cleanup
//! - [`project`]: rule matching, chooser policies, package grouping
//! - [`ai`]: generation backends and the content-addressable response cache
//! - [`pipeline`]: package runner and end-to-end session
//! - [`index`]: vector-store sink for sources and summaries
//! - [`publish`]: commit, push and pull request

pub mod ai;
pub mod analyzer;
pub mod cli;
pub mod config;
pub mod constants;
pub mod index;
pub mod pipeline;
pub mod project;
pub mod publish;
pub mod types;
pub mod workdir;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{Config, ConfigLoader};

// Error Types
pub use types::error::{AutodocError, ErrorCategory, ErrorKind, Result};

// =============================================================================
// Pipeline Re-exports
// =============================================================================

pub use pipeline::{PackageRunner, RunArtifacts, RunRequest, RunStats, Session};

pub use project::{
    ConfigChooser, FirstMatch, Interactive, Named, PackageFileMap, ProjectClassifier,
    ProjectConfig, RuleSet, build_package_files,
};

pub use workdir::{CleanupHandle, SourceLocation, WorkdirState, WorkdirSynchronizer};

// =============================================================================
// Collaborator Re-exports
// =============================================================================

pub use ai::{CachePolicy, CachedGenerator, GenerationBackend, ResponseCache, cache_key};
pub use index::{Document, MemoryVectorStore, VectorStore};
pub use publish::{Publisher, PullRequestApi};

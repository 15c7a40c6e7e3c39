//! Workdir Synchronization
//!
//! Turns a source descriptor (local path or repository URL) into a directory the
//! run can read and write, pinned to a resolved branch with a derived
//! `{branch}_autodoc` working branch checked out.
//!
//! ## State Machine
//!
//! ```text
//! URL ──► parse ──► resolve branch (ls-remote HEAD if unset)
//!                        │
//!             dir missing?──yes──► clone depth 1 ──► checkout [-b] working
//!                        │
//!                        no──► fetch ──► checkout --force base ──► pull (reset to fetched tip)
//!                                                                        │
//!                                                      checkout --force [-b] working
//! ```
//!
//! Every exit path must run the returned [`CleanupHandle`]; it also runs on drop.

pub mod git;
pub mod source;
pub mod sync;

pub use git::{GitBackend, GitCli};
pub use source::{Credentials, RepoUrl, SourceLocation};
pub use sync::{
    CleanupHandle, RepositoryHandle, WorkdirState, WorkdirSynchronizer, working_branch_name,
};

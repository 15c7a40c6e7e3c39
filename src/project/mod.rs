//! Project Classification
//!
//! Matches declarative rule files against a directory, resolves ambiguity through
//! a [`ConfigChooser`], and groups the project's files into packages.
//!
//! ## Flow
//!
//! ```text
//! RuleSet ──► ProjectClassifier::classify ──► Candidates ──► ConfigChooser
//!                                                               │
//!                              build_package_files ◄── ProjectConfig
//! ```

pub mod chooser;
pub mod classifier;
pub mod packages;
pub mod rules;

pub use chooser::{ConfigChooser, FirstMatch, Interactive, Named};
pub use classifier::{Candidates, ProjectClassifier, has_filter_files, has_root_marker};
pub use packages::{PackageFileMap, build_package_files};
pub use rules::{ModuleMatch, ProjectConfig, PromptSet, RuleSet};

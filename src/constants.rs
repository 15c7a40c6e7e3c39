//! Global Constants
//!
//! Centralized names, sentinels and defaults shared across components.

/// Workdir synchronization constants
pub mod workdir {
    /// Suffix appended to the base branch to form the working branch
    pub const WORKING_BRANCH_SUFFIX: &str = "_autodoc";

    /// Directory under the workdir root that holds synchronized clones
    pub const TEMP_DIR: &str = "temp";

    /// Path segment separating the repository from branch and sub-path in URLs
    pub const TREE_MARKER: &str = "tree";

    /// Remote name used for every fetch/pull/push
    pub const REMOTE: &str = "origin";
}

/// Project classification constants
pub mod project {
    /// Default directory holding rule files
    pub const DEFAULT_RULES_DIR: &str = "project_config";

    /// Rule file extension
    pub const RULE_EXTENSION: &str = "toml";

    /// Prompt set used when no model pattern matches
    pub const DEFAULT_PROMPT_SET: &str = "default";

    /// Package key for files directly under the project root in directory mode
    pub const ROOT_PACKAGE: &str = ".";
}

/// Generation and cache constants
pub mod generation {
    /// Default on-disk cache directory
    pub const DEFAULT_CACHE_DIR: &str = ".autodoc_cache";

    /// Default repetition penalty passed to the backend
    pub const DEFAULT_REPETITION_PENALTY: f32 = 0.7;

    /// Summary used for blank source files, without calling the backend
    pub const EMPTY_FILE_SENTINEL: &str = "Empty file";
}

/// Generated artifact names
pub mod artifacts {
    /// Primary package summary file
    pub const README: &str = "README.md";

    /// Package summary file used when a README already exists
    pub const README_GENERATED: &str = "README_GENERATED.md";

    /// Optional per-file summary document
    pub const FILES: &str = "FILES.md";

    /// Extension excluded from package directory listings
    pub const MARKDOWN_EXTENSION: &str = "md";
}

/// Indexing metadata keys and document tags
pub mod index {
    pub const META_PACKAGE: &str = "package";
    pub const META_FILENAME: &str = "filename";
    pub const META_TYPE: &str = "type";

    /// Tag for raw source content
    pub const TYPE_CODE: &str = "code";

    /// Tag for generated summaries
    pub const TYPE_DOC: &str = "doc";

    /// Results requested by the post-run similarity self check
    pub const SIM_SEARCH_TOP_K: usize = 2;
}

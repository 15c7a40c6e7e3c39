//! Declarative Project Rules
//!
//! A rule file describes how to detect a project type and how to group its files:
//!
//! ```toml
//! file_filter = [".go"]
//! project_root_filter = ["go.mod"]
//! module_match = "package_symbol"
//! stop_words = ["```"]
//!
//! [prompts.default]
//! code = "Summarize this file:\n"
//! package = "Summarize this package:\n"
//! ```
//!
//! Rules come from a directory of `*.toml` files keyed by filename, or from the
//! built-in set compiled into the binary.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::analyzer::IgnoreWalker;
use crate::constants::project::{DEFAULT_PROMPT_SET, RULE_EXTENSION};
use crate::types::{AutodocError, Result};

/// Built-in rule files as `(filename, content)`
const BUILTIN_RULES: &[(&str, &str)] = &[
    ("go.toml", include_str!("../../project_config/go.toml")),
    ("java.toml", include_str!("../../project_config/java.toml")),
    ("python.toml", include_str!("../../project_config/python.toml")),
    ("rust.toml", include_str!("../../project_config/rust.toml")),
    (
        "typescript.toml",
        include_str!("../../project_config/typescript.toml"),
    ),
];

// =============================================================================
// Module Match Mode
// =============================================================================

/// How files are grouped into packages.
///
/// Unknown mode names are kept as [`ModuleMatch::Unsupported`] so loading a rule
/// never fails on them; grouping rejects them instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ModuleMatch {
    /// Key = parent directory
    Directory,
    /// Key = `{parent directory}:{declared symbol}`
    PackageSymbol,
    Unsupported(String),
}

impl From<String> for ModuleMatch {
    fn from(value: String) -> Self {
        match value.as_str() {
            "directory" => Self::Directory,
            "package_symbol" | "go_package" => Self::PackageSymbol,
            _ => Self::Unsupported(value),
        }
    }
}

impl From<ModuleMatch> for String {
    fn from(value: ModuleMatch) -> Self {
        value.to_string()
    }
}

impl fmt::Display for ModuleMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Directory => write!(f, "directory"),
            Self::PackageSymbol => write!(f, "package_symbol"),
            Self::Unsupported(name) => write!(f, "{}", name),
        }
    }
}

// =============================================================================
// Prompt Set
// =============================================================================

/// Prompts used for one model family
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptSet {
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_fallback: Option<String>,
    pub package: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_fallback: Option<String>,
}

// =============================================================================
// Project Config
// =============================================================================

/// One declarative rule bound to a project root
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub file_filter: Vec<String>,
    #[serde(default)]
    pub project_root_filter: Vec<String>,
    pub module_match: ModuleMatch,
    #[serde(default)]
    pub stop_words: Vec<String>,
    #[serde(default)]
    pub prompts: BTreeMap<String, PromptSet>,

    /// Project root the rule is applied to
    #[serde(skip)]
    pub root_path: PathBuf,
}

impl ProjectConfig {
    /// Parse a rule from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load a rule file from disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| AutodocError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Bind this rule to a project root
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root_path = root.into();
        self
    }

    /// Whether a file name carries one of the filtered suffixes
    pub fn matches_file(&self, name: &str) -> bool {
        self.file_filter.iter().any(|suffix| name.ends_with(suffix))
    }

    /// Select the prompt set for a model.
    ///
    /// Starts from `default`; non-default keys are tried as regular expressions
    /// against the model in lexical order and the first match wins.
    pub fn prompt_set(&self, model: &str) -> Result<&PromptSet> {
        for (pattern, prompts) in &self.prompts {
            if pattern == DEFAULT_PROMPT_SET {
                continue;
            }
            match Regex::new(pattern) {
                Ok(re) if re.is_match(model) => {
                    debug!(pattern, model, "Using model-specific prompt set");
                    return Ok(prompts);
                }
                Ok(_) => {}
                Err(e) => warn!(pattern, error = %e, "Skipping invalid model pattern"),
            }
        }

        self.prompts.get(DEFAULT_PROMPT_SET).ok_or_else(|| {
            AutodocError::InvalidInput(format!(
                "rule has no '{}' prompt set and none matches model '{}'",
                DEFAULT_PROMPT_SET, model
            ))
        })
    }
}

// =============================================================================
// Rule Set
// =============================================================================

/// Rules keyed by filename (e.g. `go.toml`)
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: BTreeMap<String, ProjectConfig>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rules compiled into the binary
    pub fn builtin() -> Result<Self> {
        let mut set = Self::new();
        for (name, content) in BUILTIN_RULES {
            let rule = toml::from_str(content).map_err(|e| AutodocError::Parse {
                path: (*name).to_string(),
                message: e.to_string(),
            })?;
            set.insert(*name, rule);
        }
        Ok(set)
    }

    /// Load every `*.toml` file under `dir`, keyed by file name
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let mut set = Self::new();
        let mut failure = None;

        IgnoreWalker::new(dir).visit(|path| {
            let is_rule = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e == RULE_EXTENSION);
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                return Ok(ControlFlow::Continue(()));
            };
            if !is_rule {
                return Ok(ControlFlow::Continue(()));
            }
            match ProjectConfig::load(path) {
                Ok(rule) => {
                    set.insert(name, rule);
                    Ok(ControlFlow::Continue(()))
                }
                Err(e) => {
                    failure = Some(e);
                    Ok(ControlFlow::Break(()))
                }
            }
        })?;

        if let Some(e) = failure {
            return Err(e);
        }
        debug!(dir = %dir.display(), count = set.len(), "Loaded rule files");
        Ok(set)
    }

    /// Rules from `dir` when it exists, otherwise the built-in set
    pub fn load_or_builtin(dir: &Path) -> Result<Self> {
        if dir.is_dir() {
            Self::load_dir(dir)
        } else {
            debug!(dir = %dir.display(), "Rule directory not found, using built-in rules");
            Self::builtin()
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, rule: ProjectConfig) {
        self.rules.insert(name.into(), rule);
    }

    /// Look up a rule by filename, with or without the `.toml` extension
    pub fn get(&self, name: &str) -> Option<(&str, &ProjectConfig)> {
        let with_ext = format!("{}.{}", name, RULE_EXTENSION);
        self.rules
            .get_key_value(name)
            .or_else(|| self.rules.get_key_value(&with_ext))
            .map(|(k, v)| (k.as_str(), v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ProjectConfig)> {
        self.rules.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

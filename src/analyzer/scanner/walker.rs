use ignore::WalkBuilder;
use std::ops::ControlFlow;
use std::path::{Component, Path, PathBuf};
use tracing::warn;

use crate::types::Result;

/// VCS metadata directory that is never descended into
const VCS_DIR: &str = ".git";

/// Deterministic, `.gitignore`-aware directory walker.
///
/// Yields regular files in lexical order. Hidden files are kept, `.git` is skipped,
/// and only ignore rules found inside the root apply (no global or parent excludes).
pub struct IgnoreWalker {
    root: PathBuf,
    max_depth: Option<usize>,
}

impl IgnoreWalker {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            max_depth: None,
        }
    }

    /// Limit descent; depth 1 yields only the root's own files
    pub fn with_max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn builder(&self) -> WalkBuilder {
        let mut builder = WalkBuilder::new(&self.root);
        builder
            .hidden(false)
            .ignore(false)
            .parents(false)
            .git_ignore(true)
            .git_global(false)
            .git_exclude(false)
            .require_git(false)
            .follow_links(false)
            .max_depth(self.max_depth)
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(|entry| entry.file_name() != VCS_DIR);
        builder
    }

    /// Visit every non-ignored file until the visitor breaks or the tree is exhausted.
    ///
    /// Returns `true` when the visitor stopped the walk early.
    pub fn visit<F>(&self, mut visitor: F) -> Result<bool>
    where
        F: FnMut(&Path) -> Result<ControlFlow<()>>,
    {
        for entry in self.builder().build() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => match err.into_io_error() {
                    Some(io) => return Err(io.into()),
                    None => {
                        warn!(root = %self.root.display(), "Skipping unreadable walk entry");
                        continue;
                    }
                },
            };

            if let Some(err) = entry.error() {
                warn!(path = %entry.path().display(), error = %err, "Failed to load .gitignore rules");
            }

            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }

            if visitor(entry.path())?.is_break() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Collect all non-ignored files in walk order
    pub fn files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        self.visit(|path| {
            files.push(path.to_path_buf());
            Ok(ControlFlow::Continue(()))
        })?;
        Ok(files)
    }
}

/// Path of `path` relative to `root`, always `/`-separated.
///
/// Returns `None` when `path` is not under `root`.
pub fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    Some(parts.join("/"))
}

/// Parent directory of a `/`-separated relative path, `"."` for root-level files
pub fn relative_parent(rel: &str) -> &str {
    match rel.rfind('/') {
        Some(idx) => &rel[..idx],
        None => ".",
    }
}

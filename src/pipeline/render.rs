//! Prompt and artifact rendering.
//!
//! All outputs are deterministic: file maps are `BTreeMap`s and directory
//! listings are sorted, so identical trees render identical prompts and hit
//! the same cache entries.

use std::collections::BTreeMap;
use std::ops::ControlFlow;
use std::path::Path;

use crate::analyzer::scanner::{IgnoreWalker, relative_path};
use crate::constants::artifacts::{MARKDOWN_EXTENSION, README, README_GENERATED};
use crate::types::Result;

/// Relative file path to generated summary
pub type FileSummaries = BTreeMap<String, String>;

/// Code prompt with the file content fenced
pub fn code_prompt(prompt: &str, content: &str) -> String {
    format!("{}```\n{}\n```", prompt, content)
}

/// Package prompt: directory listing followed by every file summary
pub fn package_prompt(prompt: &str, structure: &str, summaries: &FileSummaries) -> String {
    format!("{}\n\n{}\n{}", prompt, structure, file_map_to_string(summaries))
}

/// `{file}\n{summary}\n\n` blocks in filename order
pub fn file_map_to_string(summaries: &FileSummaries) -> String {
    summaries
        .iter()
        .map(|(file, summary)| format!("{}\n{}\n\n", file, summary))
        .collect()
}

/// Markdown document with one `# {file}` section per file.
///
/// Every newline becomes a Markdown hard line break.
pub fn file_map_to_md(summaries: &FileSummaries) -> String {
    summaries
        .iter()
        .map(|(file, summary)| format!("# {}\n{}\n\n", file, summary))
        .collect::<String>()
        .replace('\n', "  \n")
}

/// Sorted listing of non-markdown files under `pkg_dir`.
///
/// `max_depth` bounds the descent; `Some(1)` lists only the directory's own files.
pub fn dir_file_structure(
    package: &str,
    pkg_dir: &Path,
    max_depth: Option<usize>,
) -> Result<String> {
    let mut entries = Vec::new();
    IgnoreWalker::new(pkg_dir).with_max_depth(max_depth).visit(|path| {
        let is_markdown = path
            .extension()
            .is_some_and(|ext| ext == MARKDOWN_EXTENSION);
        if !is_markdown && let Some(rel) = relative_path(pkg_dir, path) {
            entries.push(rel);
        }
        Ok(ControlFlow::Continue(()))
    })?;
    entries.sort();

    let mut content = format!("{} directory file structure:\n", package);
    for entry in entries {
        content.push_str("- ");
        content.push_str(&entry);
        content.push('\n');
    }
    Ok(content)
}

/// Package summary filename.
///
/// `README.md` when overwriting or when none exists yet, `README_GENERATED.md`
/// otherwise.
pub fn readme_target(pkg_dir: &Path, overwrite: bool) -> Result<&'static str> {
    if overwrite {
        return Ok(README);
    }
    match std::fs::metadata(pkg_dir.join(README)) {
        Ok(_) => Ok(README_GENERATED),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(README),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn summaries() -> FileSummaries {
        let mut map = FileSummaries::new();
        map.insert("pkg/b.go".into(), "Second.".into());
        map.insert("pkg/a.go".into(), "First\nline two.".into());
        map
    }

    #[test]
    fn test_code_prompt_fences_content() {
        assert_eq!(
            code_prompt("Describe:\n", "package a"),
            "Describe:\n```\npackage a\n```"
        );
    }

    #[test]
    fn test_file_map_to_string_sorted() {
        assert_eq!(
            file_map_to_string(&summaries()),
            "pkg/a.go\nFirst\nline two.\n\npkg/b.go\nSecond.\n\n"
        );
    }

    #[test]
    fn test_file_map_to_md_hard_breaks() {
        let mut map = FileSummaries::new();
        map.insert("a.go".into(), "One\nTwo".into());
        assert_eq!(file_map_to_md(&map), "# a.go  \nOne  \nTwo  \n  \n");
    }

    #[test]
    fn test_package_prompt_layout() {
        let mut map = FileSummaries::new();
        map.insert("a.go".into(), "A".into());
        assert_eq!(
            package_prompt("Summarize", "pkg directory file structure:\n- a.go\n", &map),
            "Summarize\n\npkg directory file structure:\n- a.go\n\na.go\nA\n\n"
        );
    }

    #[test]
    fn test_dir_file_structure_skips_markdown() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("sub")).unwrap();
        fs::write(temp.path().join("z.go"), "").unwrap();
        fs::write(temp.path().join("a.go"), "").unwrap();
        fs::write(temp.path().join("README.md"), "").unwrap();
        fs::write(temp.path().join("sub/c.go"), "").unwrap();

        let listing = dir_file_structure("pkg", temp.path(), None).unwrap();
        assert_eq!(
            listing,
            "pkg directory file structure:\n- a.go\n- sub/c.go\n- z.go\n"
        );

        let shallow = dir_file_structure(".", temp.path(), Some(1)).unwrap();
        assert_eq!(shallow, ". directory file structure:\n- a.go\n- z.go\n");
    }

    #[test]
    fn test_readme_target() {
        let temp = TempDir::new().unwrap();
        assert_eq!(readme_target(temp.path(), false).unwrap(), "README.md");

        fs::write(temp.path().join("README.md"), "hand written").unwrap();
        assert_eq!(
            readme_target(temp.path(), false).unwrap(),
            "README_GENERATED.md"
        );
        assert_eq!(readme_target(temp.path(), true).unwrap(), "README.md");
    }
}

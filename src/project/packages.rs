use std::collections::BTreeMap;
use std::ops::ControlFlow;
use tracing::debug;

use super::rules::{ModuleMatch, ProjectConfig};
use crate::analyzer::parser::SymbolRegistry;
use crate::analyzer::scanner::{IgnoreWalker, relative_parent, relative_path};
use crate::types::{AutodocError, Result};

/// Package key to sorted relative file paths
pub type PackageFileMap = BTreeMap<String, Vec<String>>;

/// Group the rule's matched files into packages.
///
/// In `directory` mode the key is the file's parent directory (`"."` for the
/// root); in `package_symbol` mode it is `"{parent}:{declared symbol}"`. Any
/// unparsable file fails the whole grouping. Every file list is sorted.
pub fn build_package_files(
    config: &ProjectConfig,
    registry: &SymbolRegistry,
) -> Result<PackageFileMap> {
    if let ModuleMatch::Unsupported(mode) = &config.module_match {
        return Err(AutodocError::InvalidInput(format!(
            "{} module match mode unimplemented",
            mode
        )));
    }

    let root = config.root_path.as_path();
    let mut packages = PackageFileMap::new();
    let mut failure = None;

    IgnoreWalker::new(root).visit(|path| {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        if !config.matches_file(name) {
            return Ok(ControlFlow::Continue(()));
        }
        let Some(rel) = relative_path(root, path) else {
            return Ok(ControlFlow::Continue(()));
        };

        let key = match &config.module_match {
            ModuleMatch::PackageSymbol => {
                let content = std::fs::read_to_string(path)?;
                match registry.extract(&rel, &content) {
                    Ok(symbol) => format!("{}:{}", relative_parent(&rel), symbol),
                    Err(e) => {
                        failure = Some(e);
                        return Ok(ControlFlow::Break(()));
                    }
                }
            }
            _ => relative_parent(&rel).to_string(),
        };

        packages.entry(key).or_default().push(rel);
        Ok(ControlFlow::Continue(()))
    })?;

    if let Some(e) = failure {
        return Err(e);
    }

    for files in packages.values_mut() {
        files.sort();
    }
    debug!(
        root = %root.display(),
        mode = %config.module_match,
        packages = packages.len(),
        "Grouped project files"
    );
    Ok(packages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn rule(root: &Path, filter: &str, mode: &str) -> ProjectConfig {
        ProjectConfig::from_toml(&format!(
            "file_filter = [\"{filter}\"]\nproject_root_filter = [\"go.mod\"]\nmodule_match = \"{mode}\"\n"
        ))
        .unwrap()
        .with_root(root)
    }

    #[test]
    fn test_directory_mode_groups_by_parent() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "go.mod", "module example.com/m\n");
        write(temp.path(), "pkg/b.go", "package pkg\n");
        write(temp.path(), "pkg/a.go", "package pkg\n");

        let packages =
            build_package_files(&rule(temp.path(), ".go", "directory"), &SymbolRegistry::new())
                .unwrap();
        assert_eq!(packages.len(), 1);
        assert_eq!(packages["pkg"], vec!["pkg/a.go", "pkg/b.go"]);
    }

    #[test]
    fn test_directory_mode_root_files() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "main.go", "package main\n");
        write(temp.path(), "internal/db/conn.go", "package db\n");
        write(temp.path(), "README.md", "# hi\n");

        let packages =
            build_package_files(&rule(temp.path(), ".go", "directory"), &SymbolRegistry::new())
                .unwrap();
        assert_eq!(packages["."], vec!["main.go"]);
        assert_eq!(packages["internal/db"], vec!["internal/db/conn.go"]);
    }

    #[test]
    fn test_symbol_mode_splits_test_packages() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "util/add.go", "package util\n");
        write(temp.path(), "util/add_test.go", "package util_test\n");
        write(temp.path(), "main.go", "package main\n");

        let packages = build_package_files(
            &rule(temp.path(), ".go", "go_package"),
            &SymbolRegistry::with_defaults(),
        )
        .unwrap();
        let keys: Vec<_> = packages.keys().cloned().collect();
        assert_eq!(keys, vec![".:main", "util:util", "util:util_test"]);
    }

    #[test]
    fn test_symbol_mode_unparsable_file_fails() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "ok/a.go", "package ok\n");
        write(temp.path(), "bad/b.go", "func {{{\n");

        let err = build_package_files(
            &rule(temp.path(), ".go", "package_symbol"),
            &SymbolRegistry::with_defaults(),
        )
        .unwrap_err();
        assert!(matches!(err, AutodocError::Parse { .. }));
    }

    #[test]
    fn test_symbol_mode_unknown_extension() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "src/lib.rs", "pub fn f() {}\n");

        let err = build_package_files(
            &rule(temp.path(), ".rs", "package_symbol"),
            &SymbolRegistry::with_defaults(),
        )
        .unwrap_err();
        assert!(matches!(err, AutodocError::InvalidInput(_)));
    }

    #[test]
    fn test_unimplemented_mode() {
        let temp = TempDir::new().unwrap();
        let err = build_package_files(
            &rule(temp.path(), ".go", "crate_graph"),
            &SymbolRegistry::new(),
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid input: crate_graph module match mode unimplemented"
        );
    }

    #[test]
    fn test_gitignored_files_skipped() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), ".gitignore", "gen/\n");
        write(temp.path(), "gen/x.go", "package gen\n");
        write(temp.path(), "pkg/a.go", "package pkg\n");

        let packages =
            build_package_files(&rule(temp.path(), ".go", "directory"), &SymbolRegistry::new())
                .unwrap();
        assert_eq!(packages.keys().collect::<Vec<_>>(), vec!["pkg"]);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_file_lists_sorted_and_stable(
            names in proptest::collection::btree_set("[a-z]{1,6}", 1..8),
            dirs in proptest::collection::vec("[a-c]", 1..8),
        ) {
            let temp = TempDir::new().unwrap();
            for (i, name) in names.iter().enumerate() {
                let dir = &dirs[i % dirs.len()];
                write(temp.path(), &format!("{dir}/{name}.go"), "package p\n");
            }
            let config = rule(temp.path(), ".go", "directory");

            let first = build_package_files(&config, &SymbolRegistry::new()).unwrap();
            let second = build_package_files(&config, &SymbolRegistry::new()).unwrap();
            prop_assert_eq!(&first, &second);

            let total: usize = first.values().map(Vec::len).sum();
            prop_assert_eq!(total, names.len());
            for files in first.values() {
                let mut sorted = files.clone();
                sorted.sort();
                prop_assert_eq!(files, &sorted);
            }
        }
    }
}

use std::collections::BTreeMap;
use std::ops::ControlFlow;
use std::path::Path;
use tracing::{debug, info};

use super::chooser::ConfigChooser;
use super::rules::{ProjectConfig, RuleSet};
use crate::analyzer::IgnoreWalker;
use crate::constants::project::RULE_EXTENSION;
use crate::types::{AutodocError, Result};

/// Matching rules keyed by rule name
pub type Candidates = BTreeMap<String, ProjectConfig>;

/// Whether at least one non-ignored file under `root` ends with a filtered suffix
pub fn has_filter_files(root: &Path, filters: &[String]) -> Result<bool> {
    if filters.is_empty() {
        return Ok(false);
    }
    IgnoreWalker::new(root).visit(|path| {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        if filters.iter().any(|suffix| name.ends_with(suffix.as_str())) {
            Ok(ControlFlow::Break(()))
        } else {
            Ok(ControlFlow::Continue(()))
        }
    })
}

/// Whether any marker file exists directly under `root`
pub fn has_root_marker(root: &Path, markers: &[String]) -> Result<bool> {
    for marker in markers {
        match std::fs::metadata(root.join(marker)) {
            Ok(_) => return Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(false)
}

/// Selector read as a rule file path: it names a directory or a `.toml` file
fn rule_file_path(selector: &str) -> Option<&Path> {
    let path = Path::new(selector);
    let is_path = selector.contains(std::path::is_separator)
        || path.extension().is_some_and(|e| e == RULE_EXTENSION);
    is_path.then_some(path)
}

/// Matches declarative rules against a project directory
pub struct ProjectClassifier {
    rules: RuleSet,
    light_check: bool,
}

impl ProjectClassifier {
    pub fn new(rules: RuleSet) -> Self {
        Self {
            rules,
            light_check: false,
        }
    }

    /// Light mode only requires a filtered file; full mode also requires a root marker
    pub fn with_light_check(mut self, light_check: bool) -> Self {
        self.light_check = light_check;
        self
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Whether a single rule matches `root`
    pub fn matches(&self, root: &Path, rule: &ProjectConfig) -> Result<bool> {
        if !has_filter_files(root, &rule.file_filter)? {
            return Ok(false);
        }
        if self.light_check {
            return Ok(true);
        }
        has_root_marker(root, &rule.project_root_filter)
    }

    /// Candidate rules for `root`.
    ///
    /// `selector` may be a rule name with or without extension (returned without
    /// matching) or, failing that, a path to a rule file (used unconditionally).
    /// Without a selector every rule is matched against the tree.
    pub fn classify(&self, root: &Path, selector: Option<&str>) -> Result<Candidates> {
        let mut candidates = Candidates::new();

        if let Some(selector) = selector {
            if let Some((name, rule)) = self.rules.get(selector) {
                candidates.insert(name.to_string(), rule.clone().with_root(root));
                return Ok(candidates);
            }
            if let Some(explicit) = rule_file_path(selector)
                && explicit.is_file()
            {
                debug!(path = %explicit.display(), "Using explicit rule file");
                let rule = ProjectConfig::load(explicit)?.with_root(root);
                candidates.insert(selector.to_string(), rule);
                return Ok(candidates);
            }
            return Err(AutodocError::InvalidInput(format!(
                "unknown project rule '{}', available rules: {}",
                selector,
                self.available()
            )));
        }

        for (name, rule) in self.rules.iter() {
            if self.matches(root, rule)? {
                debug!(rule = name, "Project rule matched");
                candidates.insert(name.to_string(), rule.clone().with_root(root));
            }
        }
        Ok(candidates)
    }

    /// Classify and let `chooser` pick one of the candidates
    pub fn resolve(
        &self,
        root: &Path,
        selector: Option<&str>,
        chooser: &mut dyn ConfigChooser,
    ) -> Result<ProjectConfig> {
        let candidates = self.classify(root, selector)?;
        if candidates.is_empty() {
            return Err(AutodocError::ClassificationAmbiguous(format!(
                "failed to detect project type in {}, available rules: {}",
                root.display(),
                self.available()
            )));
        }
        let (name, rule) = chooser.choose(candidates)?;
        info!(rule = %name, "Project rule selected");
        Ok(rule)
    }

    fn available(&self) -> String {
        self.rules.names().collect::<Vec<_>>().join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::chooser::FirstMatch;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "x").unwrap();
    }

    fn rule(filter: &str, marker: &str) -> ProjectConfig {
        ProjectConfig::from_toml(&format!(
            "file_filter = [\"{filter}\"]\nproject_root_filter = [\"{marker}\"]\nmodule_match = \"directory\"\n[prompts.default]\ncode = \"c\"\npackage = \"p\"\n"
        ))
        .unwrap()
    }

    fn rules() -> RuleSet {
        let mut set = RuleSet::new();
        set.insert("go.toml", rule(".go", "go.mod"));
        set.insert("python.toml", rule(".py", "pyproject.toml"));
        set
    }

    #[test]
    fn test_light_check_requires_filtered_file_only() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "pkg/a.go");

        let light = ProjectClassifier::new(rules()).with_light_check(true);
        let found = light.classify(temp.path(), None).unwrap();
        assert_eq!(found.keys().collect::<Vec<_>>(), vec!["go.toml"]);

        let full = ProjectClassifier::new(rules());
        assert!(full.classify(temp.path(), None).unwrap().is_empty());
    }

    #[test]
    fn test_full_check_requires_root_marker() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "go.mod");
        touch(temp.path(), "pkg/a.go");
        touch(temp.path(), "nested/pyproject.toml");
        touch(temp.path(), "tools/x.py");

        let found = ProjectClassifier::new(rules())
            .classify(temp.path(), None)
            .unwrap();
        assert_eq!(found.keys().collect::<Vec<_>>(), vec!["go.toml"]);
        assert_eq!(found["go.toml"].root_path, temp.path());
    }

    #[test]
    fn test_ignored_files_do_not_match() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "go.mod");
        touch(temp.path(), "vendor/a.go");
        fs::write(temp.path().join(".gitignore"), "vendor/\n").unwrap();

        let classifier = ProjectClassifier::new(rules());
        assert!(classifier.classify(temp.path(), None).unwrap().is_empty());
    }

    #[test]
    fn test_polyglot_tree_matches_many() {
        let temp = TempDir::new().unwrap();
        for f in ["go.mod", "pyproject.toml", "main.go", "app.py"] {
            touch(temp.path(), f);
        }
        let found = ProjectClassifier::new(rules())
            .classify(temp.path(), None)
            .unwrap();
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_named_selector_skips_matching() {
        let temp = TempDir::new().unwrap();
        let classifier = ProjectClassifier::new(rules());
        let found = classifier.classify(temp.path(), Some("python")).unwrap();
        assert_eq!(found.keys().collect::<Vec<_>>(), vec!["python.toml"]);
    }

    #[test]
    fn test_explicit_rule_file() {
        let temp = TempDir::new().unwrap();
        let rule_path = temp.path().join("custom.toml");
        fs::write(
            &rule_path,
            "file_filter = [\".zig\"]\nmodule_match = \"directory\"\n",
        )
        .unwrap();
        let selector = rule_path.to_str().unwrap();

        let found = ProjectClassifier::new(rules())
            .classify(temp.path(), Some(selector))
            .unwrap();
        assert_eq!(found[selector].file_filter, vec![".zig"]);
        assert_eq!(found[selector].root_path, temp.path());
    }

    #[test]
    fn test_plain_names_are_never_paths() {
        assert!(rule_file_path("go").is_none());
        assert!(rule_file_path("python").is_none());
        assert!(rule_file_path("rules/custom").is_some());
        assert!(rule_file_path("custom.toml").is_some());
    }

    #[test]
    fn test_rule_name_wins_over_same_named_file() {
        let temp = TempDir::new().unwrap();
        let shadow = temp.path().join("go.toml");
        fs::write(&shadow, "file_filter = [").unwrap();

        // A bare name resolves to the rule even when a same-named file exists
        let classifier = ProjectClassifier::new(rules());
        let found = classifier.classify(temp.path(), Some("go.toml")).unwrap();
        assert_eq!(found.keys().collect::<Vec<_>>(), vec!["go.toml"]);
        assert_eq!(found["go.toml"].file_filter, vec![".go"]);

        let err = classifier
            .classify(temp.path(), Some(shadow.to_str().unwrap()))
            .unwrap_err();
        assert!(matches!(err, AutodocError::Parse { .. }));
    }

    #[test]
    fn test_unknown_selector_is_invalid_input() {
        let temp = TempDir::new().unwrap();
        let err = ProjectClassifier::new(rules())
            .classify(temp.path(), Some("cobol"))
            .unwrap_err();
        assert!(matches!(err, AutodocError::InvalidInput(_)));
    }

    #[test]
    fn test_resolve_without_candidates() {
        let temp = TempDir::new().unwrap();
        let err = ProjectClassifier::new(rules())
            .resolve(temp.path(), None, &mut FirstMatch)
            .unwrap_err();
        match err {
            AutodocError::ClassificationAmbiguous(msg) => {
                assert!(msg.contains("go.toml, python.toml"))
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}

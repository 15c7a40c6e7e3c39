use serde::Serialize;

/// Fallback and empty-response bookkeeping for one run.
///
/// File entries are full paths (project root joined with the relative path);
/// package entries are package keys. Lists keep processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub fallback_file_responses: Vec<String>,
    pub empty_file_responses: Vec<String>,
    pub fallback_package_responses: Vec<String>,
    pub empty_package_responses: Vec<String>,
}

impl RunStats {
    /// No fallback was needed and every summary came back non-empty
    pub fn is_clean(&self) -> bool {
        self.fallback_file_responses.is_empty()
            && self.empty_file_responses.is_empty()
            && self.fallback_package_responses.is_empty()
            && self.empty_package_responses.is_empty()
    }

    /// Non-empty lists paired with their report headline, in report order
    pub fn warnings(&self) -> Vec<(String, &[String])> {
        [
            ("fallback attempts for files", &self.fallback_file_responses),
            ("empty LLM responses for files", &self.empty_file_responses),
            ("fallback attempts for packages", &self.fallback_package_responses),
            ("empty LLM responses for packages", &self.empty_package_responses),
        ]
        .into_iter()
        .filter(|(_, items)| !items.is_empty())
        .map(|(label, items)| (format!("{} {}", items.len(), label), items.as_slice()))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_stats_have_no_warnings() {
        let stats = RunStats::default();
        assert!(stats.is_clean());
        assert!(stats.warnings().is_empty());
    }

    #[test]
    fn test_warnings_skip_empty_lists() {
        let stats = RunStats {
            fallback_file_responses: vec!["/p/a.go".into(), "/p/b.go".into()],
            empty_package_responses: vec!["pkg".into()],
            ..Default::default()
        };
        assert!(!stats.is_clean());

        let warnings = stats.warnings();
        assert_eq!(warnings.len(), 2);
        assert_eq!(warnings[0].0, "2 fallback attempts for files");
        assert_eq!(warnings[1].0, "1 empty LLM responses for packages");
        assert_eq!(warnings[1].1, ["pkg".to_string()]);
    }
}

//! Rule Choosers
//!
//! Polyglot trees often match several rules. A [`ConfigChooser`] decides which
//! candidate a run uses:
//!
//! - [`FirstMatch`]: lexically first rule name, deterministic
//! - [`Interactive`]: numbered prompt on a terminal
//! - [`Named`]: explicit rule name override

use console::style;
use std::io::{BufRead, Write};

use super::classifier::Candidates;
use super::rules::ProjectConfig;
use crate::constants::project::RULE_EXTENSION;
use crate::types::{AutodocError, Result};

/// Picks one rule out of several candidates
pub trait ConfigChooser {
    fn choose(&mut self, candidates: Candidates) -> Result<(String, ProjectConfig)>;
}

fn no_candidates() -> AutodocError {
    AutodocError::ClassificationAmbiguous("no project rule candidates to choose from".into())
}

fn name_matches(name: &str, input: &str) -> bool {
    name == input
        || name
            .strip_suffix(RULE_EXTENSION)
            .and_then(|s| s.strip_suffix('.'))
            .is_some_and(|stem| stem == input)
}

// =============================================================================
// First Match
// =============================================================================

/// Deterministic choice of the lexically first rule name
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstMatch;

impl ConfigChooser for FirstMatch {
    fn choose(&mut self, candidates: Candidates) -> Result<(String, ProjectConfig)> {
        candidates.into_iter().next().ok_or_else(no_candidates)
    }
}

// =============================================================================
// Named
// =============================================================================

/// Explicit rule name, with or without extension
#[derive(Debug, Clone)]
pub struct Named(pub String);

impl ConfigChooser for Named {
    fn choose(&mut self, candidates: Candidates) -> Result<(String, ProjectConfig)> {
        let available = candidates.keys().cloned().collect::<Vec<_>>().join(", ");
        candidates
            .into_iter()
            .find(|(name, _)| name_matches(name, &self.0))
            .ok_or_else(|| {
                AutodocError::ClassificationAmbiguous(format!(
                    "rule '{}' is not among the matches: {}",
                    self.0, available
                ))
            })
    }
}

// =============================================================================
// Interactive
// =============================================================================

/// Asks the user to pick a rule by number, filename or stem.
///
/// A single candidate is returned without prompting. Invalid answers re-prompt;
/// end of input fails the classification.
pub struct Interactive {
    input: Box<dyn BufRead>,
    output: Box<dyn Write>,
}

impl Interactive {
    pub fn new(input: impl BufRead + 'static, output: impl Write + 'static) -> Self {
        Self {
            input: Box::new(input),
            output: Box::new(output),
        }
    }

    /// Prompt on the process terminal
    pub fn terminal() -> Self {
        Self::new(std::io::stdin().lock(), console::Term::stdout())
    }

    fn select(&self, names: &[String], answer: &str) -> Option<usize> {
        if let Ok(index) = answer.parse::<usize>() {
            return (1..=names.len()).contains(&index).then(|| index - 1);
        }
        names.iter().position(|name| name_matches(name, answer))
    }
}

impl ConfigChooser for Interactive {
    fn choose(&mut self, mut candidates: Candidates) -> Result<(String, ProjectConfig)> {
        if candidates.len() <= 1 {
            return candidates.pop_first().ok_or_else(no_candidates);
        }

        let names: Vec<String> = candidates.keys().cloned().collect();
        writeln!(
            self.output,
            "{}",
            style("Multiple project rule matches found!").yellow()
        )?;
        for (i, name) in names.iter().enumerate() {
            writeln!(self.output, "{}. {}", i + 1, name)?;
        }

        loop {
            write!(self.output, "Enter the number or filename: ")?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Err(AutodocError::ClassificationAmbiguous(
                    "no project rule selected".into(),
                ));
            }

            if let Some(index) = self.select(&names, line.trim()) {
                let name = names[index].clone();
                return candidates
                    .remove_entry(&name)
                    .ok_or_else(no_candidates);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn candidates(names: &[&str]) -> Candidates {
        names
            .iter()
            .map(|n| {
                let rule = ProjectConfig::from_toml("module_match = \"directory\"").unwrap();
                (n.to_string(), rule)
            })
            .collect()
    }

    #[test]
    fn test_first_match_is_lexical() {
        let (name, _) = FirstMatch
            .choose(candidates(&["typescript.toml", "go.toml", "python.toml"]))
            .unwrap();
        assert_eq!(name, "go.toml");
    }

    #[test]
    fn test_first_match_empty() {
        let err = FirstMatch.choose(Candidates::new()).unwrap_err();
        assert!(matches!(err, AutodocError::ClassificationAmbiguous(_)));
    }

    #[test]
    fn test_named_by_stem() {
        let (name, _) = Named("python".into())
            .choose(candidates(&["go.toml", "python.toml"]))
            .unwrap();
        assert_eq!(name, "python.toml");
        assert!(Named("rust".into()).choose(candidates(&["go.toml"])).is_err());
    }

    #[test]
    fn test_interactive_single_candidate_skips_prompt() {
        let out = SharedBuf::default();
        let mut chooser = Interactive::new(Cursor::new(Vec::new()), out.clone());
        let (name, _) = chooser.choose(candidates(&["go.toml"])).unwrap();
        assert_eq!(name, "go.toml");
        assert!(out.0.lock().unwrap().is_empty());
    }

    #[test]
    fn test_interactive_reprompts_until_valid() {
        let out = SharedBuf::default();
        let input = Cursor::new(b"9\nruby\n2\n".to_vec());
        let mut chooser = Interactive::new(input, out.clone());
        let (name, _) = chooser
            .choose(candidates(&["go.toml", "python.toml"]))
            .unwrap();
        assert_eq!(name, "python.toml");

        let printed = String::from_utf8(out.0.lock().unwrap().clone()).unwrap();
        assert!(printed.contains("1. go.toml"));
        assert_eq!(printed.matches("Enter the number").count(), 3);
    }

    #[test]
    fn test_interactive_accepts_filename_and_stem() {
        let mut chooser = Interactive::new(Cursor::new(b"go\n".to_vec()), SharedBuf::default());
        let (name, _) = chooser
            .choose(candidates(&["go.toml", "python.toml"]))
            .unwrap();
        assert_eq!(name, "go.toml");

        let mut chooser =
            Interactive::new(Cursor::new(b"python.toml\n".to_vec()), SharedBuf::default());
        let (name, _) = chooser
            .choose(candidates(&["go.toml", "python.toml"]))
            .unwrap();
        assert_eq!(name, "python.toml");
    }

    #[test]
    fn test_interactive_end_of_input() {
        let mut chooser = Interactive::new(Cursor::new(Vec::new()), SharedBuf::default());
        let err = chooser
            .choose(candidates(&["go.toml", "python.toml"]))
            .unwrap_err();
        assert!(matches!(err, AutodocError::ClassificationAmbiguous(_)));
    }
}

//! Run Command
//!
//! Documents a local directory or a repository URL end to end.
//!
//! Usage:
//!   autodoc [DIR]
//!   autodoc -g https://github.com/owner/repo/tree/main/pkg -w

use std::io::IsTerminal;
use std::path::PathBuf;

use tokio::runtime::Runtime;
use tracing::debug;

use crate::ai::CachePolicy;
use crate::cli::ui::Output;
use crate::config::{Config, ConfigLoader};
use crate::pipeline::{RunArtifacts, RunRequest, Session, parse_package_list};
use crate::project::{ConfigChooser, FirstMatch, Interactive};
use crate::types::Result;
use crate::workdir::{Credentials, SourceLocation};

/// Command line options for one run
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Repository URL; takes precedence over `dir`
    pub repository: Option<String>,
    pub branch: Option<String>,
    pub username: Option<String>,
    pub token: Option<String>,
    /// Rule file path or rule name
    pub selector: Option<String>,
    /// Comma-separated package allow-list
    pub packages: Option<String>,
    pub create_pr: bool,
    pub light_check: bool,
    pub with_file_summary: bool,
    pub overwrite_readme: bool,
    pub overwrite_cache: bool,
    pub embeddings: bool,
    pub cache_path: Option<PathBuf>,
    pub dir: Option<PathBuf>,
}

impl RunOptions {
    /// Fold command line values over loaded configuration
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(path) = &self.cache_path {
            config.cache.path = path.clone();
        }
        if let Some(username) = &self.username {
            config.github.username = Some(username.clone());
        }
        if let Some(token) = &self.token {
            config.github.token = Some(token.clone());
        }
    }

    /// Source location described by these options
    pub fn source(&self, config: &Config) -> SourceLocation {
        let Some(url) = &self.repository else {
            return SourceLocation::local(self.dir.clone().unwrap_or_else(|| PathBuf::from(".")));
        };

        let mut source = SourceLocation::remote(url.clone());
        if let Some(branch) = &self.branch {
            source = source.with_branch(branch.clone());
        }
        let username = config.github.username.clone().unwrap_or_default();
        let token = config.github.token.clone().unwrap_or_default();
        let credentials = Credentials::new(username, token);
        if credentials.is_complete() {
            source = source.with_credentials(credentials);
        }
        source
    }

    pub fn request(&self, config: &Config) -> RunRequest {
        let mut request = RunRequest::new(self.source(config));
        request.selector = self.selector.clone();
        request.packages = self
            .packages
            .as_deref()
            .map(parse_package_list)
            .filter(|p| !p.is_empty());
        request.create_pr = self.create_pr;
        request.light_check = self.light_check;
        request.with_file_summary = self.with_file_summary;
        request.overwrite_readme = self.overwrite_readme;
        request.cache_policy = CachePolicy {
            overwrite: self.overwrite_cache,
            ignore: false,
        };
        request.embeddings = self.embeddings;
        request
    }
}

/// Load configuration, run the session and print the report
pub fn run(options: RunOptions) -> Result<RunArtifacts> {
    let mut config = ConfigLoader::load()?;
    options.apply_to(&mut config);
    debug!(config = ?config, "Effective configuration");

    let request = options.request(&config);
    let session = Session::new(config)?;

    let mut chooser: Box<dyn ConfigChooser> = if std::io::stdin().is_terminal() {
        Box::new(Interactive::terminal())
    } else {
        Box::new(FirstMatch)
    };

    let rt = Runtime::new()?;
    let mut stdout = std::io::stdout();
    let artifacts = rt.block_on(session.run(&request, chooser.as_mut(), &mut stdout))?;

    Output::new().report(&artifacts);
    Ok(artifacts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_source_defaults_to_current_dir() {
        let options = RunOptions::default();
        match options.source(&Config::default()) {
            SourceLocation::Local(path) => assert_eq!(path, PathBuf::from(".")),
            other => panic!("unexpected source {:?}", other),
        }
    }

    #[test]
    fn test_remote_source_carries_branch_and_credentials() {
        let options = RunOptions {
            repository: Some("https://github.com/owner/repo".into()),
            branch: Some("dev".into()),
            username: Some("bot".into()),
            token: Some("ghp_x".into()),
            dir: Some(PathBuf::from("ignored")),
            ..Default::default()
        };
        let mut config = Config::default();
        options.apply_to(&mut config);

        match options.source(&config) {
            SourceLocation::Remote {
                url,
                branch,
                credentials,
            } => {
                assert_eq!(url, "https://github.com/owner/repo");
                assert_eq!(branch.as_deref(), Some("dev"));
                assert_eq!(credentials.map(|c| c.username), Some("bot".to_string()));
            }
            other => panic!("unexpected source {:?}", other),
        }
    }

    #[test]
    fn test_token_without_username_is_not_used_for_clone() {
        let options = RunOptions {
            repository: Some("https://github.com/owner/repo".into()),
            token: Some("ghp_x".into()),
            ..Default::default()
        };
        let mut config = Config::default();
        options.apply_to(&mut config);

        assert_eq!(config.github.token.as_deref(), Some("ghp_x"));
        assert!(matches!(
            options.source(&config),
            SourceLocation::Remote {
                credentials: None,
                ..
            }
        ));
    }

    #[test]
    fn test_request_flags() {
        let options = RunOptions {
            packages: Some("a, b".into()),
            overwrite_cache: true,
            with_file_summary: true,
            selector: Some("go".into()),
            ..Default::default()
        };
        let request = options.request(&Config::default());

        assert_eq!(request.packages, Some(vec!["a".to_string(), "b".to_string()]));
        assert!(request.cache_policy.overwrite);
        assert!(!request.cache_policy.ignore);
        assert!(request.with_file_summary);
        assert_eq!(request.selector.as_deref(), Some("go"));
    }
}

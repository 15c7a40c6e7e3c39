use secrecy::SecretString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::git::GitBackend;
use super::source::{Credentials, RepoUrl, SourceLocation};
use crate::constants::workdir::{TEMP_DIR, WORKING_BRANCH_SUFFIX};
use crate::types::{AutodocError, Result};

/// Working branch derived from a base branch
pub fn working_branch_name(base: &str) -> String {
    format!("{}{}", base, WORKING_BRANCH_SUFFIX)
}

// =============================================================================
// Cleanup
// =============================================================================

/// Removes a synchronized clone when invoked or dropped.
///
/// Running it more than once is a no-op.
#[must_use = "dropping the handle removes the workdir immediately"]
pub struct CleanupHandle {
    path: Option<PathBuf>,
}

impl CleanupHandle {
    /// Handle that never removes anything
    pub fn noop() -> Self {
        Self { path: None }
    }

    pub fn remove_dir(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Keep the directory on disk
    pub fn disarm(&mut self) {
        self.path = None;
    }

    pub fn is_armed(&self) -> bool {
        self.path.is_some()
    }

    pub fn run(&mut self) {
        let Some(path) = self.path.take() else {
            return;
        };
        match std::fs::remove_dir_all(&path) {
            Ok(()) => debug!(path = %path.display(), "Removed workdir"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove workdir"),
        }
    }
}

impl Drop for CleanupHandle {
    fn drop(&mut self) {
        self.run();
    }
}

impl fmt::Debug for CleanupHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CleanupHandle")
            .field("path", &self.path)
            .finish()
    }
}

// =============================================================================
// Workdir State
// =============================================================================

/// A synchronized clone of a remote repository
pub struct RepositoryHandle {
    /// Clone root
    pub path: PathBuf,
    pub url: RepoUrl,
    /// Remote URL with credentials, if any
    pub remote: SecretString,
    pub base_branch: String,
    pub working_branch: String,
}

impl fmt::Debug for RepositoryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepositoryHandle")
            .field("path", &self.path)
            .field("url", &self.url.repository.as_str())
            .field("base_branch", &self.base_branch)
            .field("working_branch", &self.working_branch)
            .finish()
    }
}

/// Directory a run works in, plus what is needed to publish from and clean it up
#[derive(Debug)]
pub struct WorkdirState {
    /// Final working directory, including any sub-path
    pub local_path: PathBuf,
    /// `None` for local sources
    pub repository: Option<RepositoryHandle>,
    pub cleanup: CleanupHandle,
}

impl WorkdirState {
    pub fn resolved_branch(&self) -> Option<&str> {
        self.repository.as_ref().map(|r| r.base_branch.as_str())
    }

    pub fn working_branch(&self) -> Option<&str> {
        self.repository.as_ref().map(|r| r.working_branch.as_str())
    }

    /// Repository name for remote sources, directory name for local ones
    pub fn project_name(&self) -> String {
        match &self.repository {
            Some(repo) => repo.url.name.clone(),
            None => self
                .local_path
                .canonicalize()
                .unwrap_or_else(|_| self.local_path.clone())
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "project".to_string()),
        }
    }
}

// =============================================================================
// Synchronizer
// =============================================================================

/// Resolves a [`SourceLocation`] into a local, branch-pinned directory.
///
/// Remote sources map to `{root}/temp/{owner}/{repo}/{branch}`. A missing directory
/// is shallow-cloned; an existing one is fetched and its base branch is moved to
/// the fetched tip, so repeated runs converge instead of re-cloning.
pub struct WorkdirSynchronizer {
    git: Arc<dyn GitBackend>,
    root: PathBuf,
    keep: bool,
}

impl WorkdirSynchronizer {
    pub fn new(git: Arc<dyn GitBackend>, root: impl Into<PathBuf>) -> Self {
        Self {
            git,
            root: root.into(),
            keep: false,
        }
    }

    /// Leave clones on disk when the cleanup handle runs
    pub fn with_keep(mut self, keep: bool) -> Self {
        self.keep = keep;
        self
    }

    /// Deterministic clone directory for a repository and branch
    pub fn clone_dir(&self, url: &RepoUrl, branch: &str) -> PathBuf {
        self.root
            .join(TEMP_DIR)
            .join(&url.owner)
            .join(&url.name)
            .join(branch)
    }

    pub async fn sync(&self, source: &SourceLocation) -> Result<WorkdirState> {
        match source {
            SourceLocation::Local(path) => self.sync_local(path),
            SourceLocation::Remote {
                url,
                branch,
                credentials,
            } => {
                self.sync_remote(url, branch.as_deref(), credentials.as_ref())
                    .await
            }
        }
    }

    fn sync_local(&self, path: &Path) -> Result<WorkdirState> {
        if !path.is_dir() {
            return Err(AutodocError::InvalidInput(format!(
                "{} is not a directory",
                path.display()
            )));
        }
        Ok(WorkdirState {
            local_path: path.to_path_buf(),
            repository: None,
            cleanup: CleanupHandle::noop(),
        })
    }

    async fn sync_remote(
        &self,
        raw_url: &str,
        branch: Option<&str>,
        credentials: Option<&Credentials>,
    ) -> Result<WorkdirState> {
        let url = RepoUrl::parse(raw_url)?;
        let remote = url.authenticated(credentials)?;

        let base_branch = match branch.or(url.branch.as_deref()) {
            Some(b) => b.to_string(),
            None => {
                let resolved = self.git.default_branch(&remote).await?;
                debug!(branch = %resolved, "Resolved remote HEAD");
                resolved
            }
        };
        let working_branch = working_branch_name(&base_branch);
        let dir = self.clone_dir(&url, &base_branch);

        let mut cleanup = if self.keep {
            CleanupHandle::noop()
        } else {
            CleanupHandle::remove_dir(&dir)
        };

        self.converge(
            &dir,
            &remote,
            url.repository.as_str(),
            &base_branch,
            &working_branch,
        )
        .await?;

        let local_path = match &url.sub_path {
            Some(sub) => dir.join(sub),
            None => dir.clone(),
        };
        if !local_path.is_dir() {
            cleanup.run();
            return Err(AutodocError::InvalidInput(format!(
                "sub-path '{}' does not exist in {}",
                url.sub_path.as_deref().unwrap_or_default(),
                url.repository
            )));
        }

        Ok(WorkdirState {
            local_path,
            repository: Some(RepositoryHandle {
                path: dir,
                url,
                remote,
                base_branch,
                working_branch,
            }),
            cleanup,
        })
    }

    /// Bring `dir` to the tip of `base` with `working` checked out.
    ///
    /// A missing directory is cloned; an existing one is fetched and reset, so
    /// repeated calls converge on the same directory.
    async fn converge(
        &self,
        dir: &Path,
        remote: &SecretString,
        origin: &str,
        base: &str,
        working: &str,
    ) -> Result<()> {
        let reused = dir.exists();
        if reused {
            info!(dir = %dir.display(), branch = %base, "Updating existing workdir");
            self.git.fetch(dir, remote, base).await?;
            self.git.checkout(dir, base, false, true).await?;
            self.git.pull(dir, base).await?;
        } else {
            info!(dir = %dir.display(), branch = %base, "Cloning repository");
            tokio::fs::create_dir_all(dir).await?;
            self.git.clone_shallow(remote, origin, base, dir).await?;
        }

        let exists = self.git.branch_exists(dir, working).await?;
        self.git.checkout(dir, working, !exists, reused).await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::workdir::git::GitCli;
    use crate::workdir::git::tests::{Upstream, git};
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Records git calls and simulates a repository on disk
    #[derive(Default)]
    pub(crate) struct FakeGit {
        pub calls: Mutex<Vec<String>>,
        pub branches: Mutex<HashSet<String>>,
        pub origins: Mutex<Vec<String>>,
        pub head: String,
        pub fail_on: Option<&'static str>,
        pub dirty: bool,
    }

    impl FakeGit {
        pub fn new(head: &str) -> Self {
            Self {
                head: head.to_string(),
                ..Default::default()
            }
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, op: &str, call: String) -> Result<()> {
            self.calls.lock().unwrap().push(call);
            if self.fail_on == Some(op) {
                return Err(AutodocError::sync(op, "simulated failure"));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl GitBackend for FakeGit {
        async fn default_branch(&self, _url: &SecretString) -> Result<String> {
            self.record("ls-remote", "ls-remote".into())?;
            Ok(self.head.clone())
        }

        async fn clone_shallow(
            &self,
            _url: &SecretString,
            origin: &str,
            branch: &str,
            dest: &Path,
        ) -> Result<()> {
            self.record("clone", format!("clone {}", branch))?;
            self.origins.lock().unwrap().push(origin.to_string());
            std::fs::create_dir_all(dest.join(".git"))?;
            std::fs::create_dir_all(dest.join("pkg"))?;
            self.branches.lock().unwrap().insert(branch.to_string());
            Ok(())
        }

        async fn branch_exists(&self, _repo: &Path, branch: &str) -> Result<bool> {
            Ok(self.branches.lock().unwrap().contains(branch))
        }

        async fn checkout(
            &self,
            _repo: &Path,
            branch: &str,
            create: bool,
            force: bool,
        ) -> Result<()> {
            let mut call = "checkout".to_string();
            if force {
                call.push_str(" --force");
            }
            if create {
                call.push_str(" -b");
            }
            call.push(' ');
            call.push_str(branch);
            self.record("checkout", call)?;
            self.branches.lock().unwrap().insert(branch.to_string());
            Ok(())
        }

        async fn fetch(&self, _repo: &Path, _url: &SecretString, branch: &str) -> Result<()> {
            self.record("fetch", format!("fetch {}", branch))
        }

        async fn pull(&self, _repo: &Path, branch: &str) -> Result<()> {
            self.record("pull", format!("pull {}", branch))
        }

        async fn commit_all(&self, _repo: &Path, message: &str) -> Result<bool> {
            self.record("commit", format!("commit {}", message))?;
            Ok(self.dirty)
        }

        async fn push(&self, _repo: &Path, _url: &SecretString, branch: &str) -> Result<()> {
            self.record("push", format!("push {}", branch))
        }
    }

    fn synchronizer(git: &Arc<FakeGit>, root: &Path) -> WorkdirSynchronizer {
        let backend: Arc<dyn GitBackend> = git.clone();
        WorkdirSynchronizer::new(backend, root)
    }

    #[tokio::test]
    async fn test_resolves_head_and_clones() {
        let temp = TempDir::new().unwrap();
        let git = Arc::new(FakeGit::new("main"));
        let sync = synchronizer(&git, temp.path());

        let mut state = sync
            .sync(&SourceLocation::remote("https://example.com/owner/repo"))
            .await
            .unwrap();

        let expected = temp.path().join("temp/owner/repo/main");
        assert_eq!(state.local_path, expected);
        assert_eq!(state.resolved_branch(), Some("main"));
        assert_eq!(state.working_branch(), Some("main_autodoc"));
        assert_eq!(state.project_name(), "repo");
        assert_eq!(
            git.calls(),
            vec!["ls-remote", "clone main", "checkout -b main_autodoc"]
        );

        state.cleanup.run();
        assert!(!expected.exists());
    }

    #[tokio::test]
    async fn test_clone_origin_carries_no_credentials() {
        let temp = TempDir::new().unwrap();
        let git = Arc::new(FakeGit::new("main"));
        let sync = synchronizer(&git, temp.path());
        let source = SourceLocation::remote("https://github.com/owner/repo")
            .with_credentials(Credentials::new("bot", "ghp_secret"));

        let state = sync.sync(&source).await.unwrap();

        let origins = git.origins.lock().unwrap().clone();
        assert_eq!(origins, vec!["https://github.com/owner/repo"]);
        let repo = state.repository.as_ref().unwrap();
        assert!(secrecy::ExposeSecret::expose_secret(&repo.remote).contains("ghp_secret"));
    }

    #[tokio::test]
    async fn test_repeated_sync_converges_without_reclone() {
        let temp = TempDir::new().unwrap();
        let git = Arc::new(FakeGit::new("main"));
        let sync = synchronizer(&git, temp.path());
        let source = SourceLocation::remote("https://example.com/owner/repo").with_branch("main");

        let mut first = sync.sync(&source).await.unwrap();
        first.cleanup.disarm();
        let second = sync.sync(&source).await.unwrap();

        assert_eq!(first.local_path, second.local_path);
        let calls = git.calls();
        assert_eq!(calls.iter().filter(|c| c.starts_with("clone")).count(), 1);
        assert!(!calls.contains(&"ls-remote".to_string()));
        assert_eq!(
            &calls[2..],
            &[
                "fetch main",
                "checkout --force main",
                "pull main",
                "checkout --force main_autodoc"
            ]
        );
    }

    #[tokio::test]
    async fn test_kept_workdir_follows_upstream_commits() {
        let temp = TempDir::new().unwrap();
        let upstream = Upstream::new(temp.path());
        let remote = SecretString::from(upstream.url());
        let sync = WorkdirSynchronizer::new(Arc::new(GitCli::new()), temp.path());
        let dir = temp.path().join("work");

        sync.converge(&dir, &remote, &upstream.url(), "main", "main_autodoc")
            .await
            .unwrap();
        let tip = upstream.commit("util.go", "package main\n");

        sync.converge(&dir, &remote, &upstream.url(), "main", "main_autodoc")
            .await
            .unwrap();
        assert_eq!(git(&dir, &["rev-parse", "main"]), tip);
        assert_eq!(git(&dir, &["branch", "--show-current"]), "main_autodoc");

        // Unchanged upstream is still a successful update
        sync.converge(&dir, &remote, &upstream.url(), "main", "main_autodoc")
            .await
            .unwrap();
        assert_eq!(git(&dir, &["rev-parse", "main"]), tip);
    }

    #[tokio::test]
    async fn test_branch_from_url_and_sub_path() {
        let temp = TempDir::new().unwrap();
        let git = Arc::new(FakeGit::new("main"));
        let sync = synchronizer(&git, temp.path()).with_keep(true);

        let state = sync
            .sync(&SourceLocation::remote(
                "https://example.com/owner/repo/tree/dev/pkg",
            ))
            .await
            .unwrap();
        assert_eq!(state.local_path, temp.path().join("temp/owner/repo/dev/pkg"));
        assert_eq!(state.working_branch(), Some("dev_autodoc"));
        assert!(!state.cleanup.is_armed());
    }

    #[tokio::test]
    async fn test_explicit_branch_wins_over_url() {
        let temp = TempDir::new().unwrap();
        let git = Arc::new(FakeGit::new("main"));
        let sync = synchronizer(&git, temp.path());

        let state = sync
            .sync(
                &SourceLocation::remote("https://example.com/owner/repo/tree/dev")
                    .with_branch("release"),
            )
            .await
            .unwrap();
        assert_eq!(state.resolved_branch(), Some("release"));
    }

    #[tokio::test]
    async fn test_missing_sub_path_is_invalid_and_cleaned() {
        let temp = TempDir::new().unwrap();
        let git = Arc::new(FakeGit::new("main"));
        let sync = synchronizer(&git, temp.path());

        let err = sync
            .sync(&SourceLocation::remote(
                "https://example.com/owner/repo/tree/main/nope",
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, AutodocError::InvalidInput(_)));
        assert!(!temp.path().join("temp/owner/repo/main").exists());
    }

    #[tokio::test]
    async fn test_failure_names_operation_and_cleans_up() {
        let temp = TempDir::new().unwrap();
        let git = Arc::new(FakeGit {
            fail_on: Some("checkout"),
            ..FakeGit::new("main")
        });
        let sync = synchronizer(&git, temp.path());

        let err = sync
            .sync(&SourceLocation::remote("https://example.com/owner/repo"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "git checkout failed: simulated failure");
        assert!(!temp.path().join("temp/owner/repo/main").exists());
    }

    #[tokio::test]
    async fn test_local_source() {
        let temp = TempDir::new().unwrap();
        let git = Arc::new(FakeGit::new("main"));
        let sync = synchronizer(&git, temp.path());

        let state = sync.sync(&SourceLocation::local(temp.path())).await.unwrap();
        assert_eq!(state.local_path, temp.path());
        assert!(state.repository.is_none());
        assert!(!state.cleanup.is_armed());
        assert!(git.calls().is_empty());

        let err = sync
            .sync(&SourceLocation::local(temp.path().join("missing")))
            .await
            .unwrap_err();
        assert!(matches!(err, AutodocError::InvalidInput(_)));
    }

    #[test]
    fn test_cleanup_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("clone");
        std::fs::create_dir_all(&dir).unwrap();

        let mut handle = CleanupHandle::remove_dir(&dir);
        handle.run();
        handle.run();
        assert!(!dir.exists());
        assert!(!handle.is_armed());
    }
}

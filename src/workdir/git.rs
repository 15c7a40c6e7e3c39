//! Source-Control Collaborator
//!
//! [`GitBackend`] abstracts every git operation the synchronizer and publisher
//! need. [`GitCli`] drives the system `git` binary through `tokio::process`;
//! tests substitute a fake.
//!
//! Remote URLs may carry credentials, so they are passed as [`SecretString`] and
//! any userinfo echoed back in git's stderr is masked before it reaches an error.
//! Clones record only the plain repository URL as `origin`, so no token is left in
//! `.git/config`.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use crate::constants::workdir::REMOTE;
use crate::types::{AutodocError, Result};

/// Git operations used by synchronization and publishing
#[async_trait]
pub trait GitBackend: Send + Sync {
    /// Branch the remote's symbolic `HEAD` points at, without cloning
    async fn default_branch(&self, url: &SecretString) -> Result<String>;

    /// Shallow, single-branch, depth-1 clone without submodules.
    ///
    /// `origin` is the credential-free URL stored as the clone's remote.
    async fn clone_shallow(
        &self,
        url: &SecretString,
        origin: &str,
        branch: &str,
        dest: &Path,
    ) -> Result<()>;

    async fn branch_exists(&self, repo: &Path, branch: &str) -> Result<bool>;

    async fn checkout(&self, repo: &Path, branch: &str, create: bool, force: bool) -> Result<()>;

    /// Depth-1 fetch of `branch` into its remote-tracking ref; "already up to date" is success
    async fn fetch(&self, repo: &Path, url: &SecretString, branch: &str) -> Result<()>;

    /// Move the checked-out `branch` to its last fetched tip.
    ///
    /// A depth-1 history cannot fast-forward once upstream moves, so the branch is
    /// reset onto the remote-tracking ref instead of merged.
    async fn pull(&self, repo: &Path, branch: &str) -> Result<()>;

    /// Stage all changes and commit; returns `false` when there was nothing to commit
    async fn commit_all(&self, repo: &Path, message: &str) -> Result<bool>;

    async fn push(&self, repo: &Path, url: &SecretString, branch: &str) -> Result<()>;
}

/// [`GitBackend`] backed by the `git` executable
#[derive(Debug, Clone)]
pub struct GitCli {
    program: String,
}

impl Default for GitCli {
    fn default() -> Self {
        Self {
            program: "git".to_string(),
        }
    }
}

impl GitCli {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific git executable
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command(&self, dir: Option<&Path>) -> Command {
        let mut cmd = Command::new(&self.program);
        if let Some(dir) = dir {
            cmd.current_dir(dir);
        }
        cmd.env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    /// Run git and return its exit status, naming `operation` on spawn failure
    async fn status(&self, operation: &str, dir: &Path, args: &[&str]) -> Result<bool> {
        let output = self
            .command(Some(dir))
            .args(args)
            .output()
            .await
            .map_err(|e| AutodocError::sync(operation, e.to_string()))?;
        Ok(output.status.success())
    }

    /// Run git and return stdout, naming `operation` on failure
    async fn run(&self, operation: &str, dir: Option<&Path>, args: &[&str]) -> Result<String> {
        debug!(operation, dir = ?dir, "Running git");
        let output = self
            .command(dir)
            .args(args)
            .output()
            .await
            .map_err(|e| AutodocError::sync(operation, e.to_string()))?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if output.status.success() {
            return Ok(stdout);
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        if is_up_to_date(&stdout) || is_up_to_date(&stderr) {
            return Ok(stdout);
        }
        Err(AutodocError::sync(operation, mask_userinfo(stderr.trim())))
    }
}

#[async_trait]
impl GitBackend for GitCli {
    async fn default_branch(&self, url: &SecretString) -> Result<String> {
        let out = self
            .run(
                "ls-remote",
                None,
                &["ls-remote", "--symref", url.expose_secret(), "HEAD"],
            )
            .await?;
        parse_symref_head(&out)
            .ok_or_else(|| AutodocError::sync("ls-remote", "HEAD reference not found"))
    }

    async fn clone_shallow(
        &self,
        url: &SecretString,
        origin: &str,
        branch: &str,
        dest: &Path,
    ) -> Result<()> {
        let target = dest.to_string_lossy();
        self.run(
            "clone",
            None,
            &[
                "clone",
                "--depth",
                "1",
                "--single-branch",
                "--no-recurse-submodules",
                "--branch",
                branch,
                url.expose_secret(),
                &target,
            ],
        )
        .await?;
        self.run(
            "clone",
            Some(dest),
            &["remote", "set-url", REMOTE, origin],
        )
        .await?;
        Ok(())
    }

    async fn branch_exists(&self, repo: &Path, branch: &str) -> Result<bool> {
        let reference = format!("refs/heads/{}", branch);
        self.status(
            "rev-parse",
            repo,
            &["rev-parse", "--verify", "--quiet", &reference],
        )
        .await
    }

    async fn checkout(&self, repo: &Path, branch: &str, create: bool, force: bool) -> Result<()> {
        let mut args = vec!["checkout"];
        if force {
            args.push("--force");
        }
        if create {
            args.push("-b");
        }
        args.push(branch);
        self.run("checkout", Some(repo), &args).await?;
        Ok(())
    }

    async fn fetch(&self, repo: &Path, url: &SecretString, branch: &str) -> Result<()> {
        let refspec = format!("+refs/heads/{b}:refs/remotes/{REMOTE}/{b}", b = branch);
        self.run(
            "fetch",
            Some(repo),
            &["fetch", "--depth", "1", url.expose_secret(), &refspec],
        )
        .await?;
        Ok(())
    }

    async fn pull(&self, repo: &Path, branch: &str) -> Result<()> {
        let tracking = format!("refs/remotes/{}/{}", REMOTE, branch);
        self.run("pull", Some(repo), &["reset", "--hard", &tracking])
            .await?;
        Ok(())
    }

    async fn commit_all(&self, repo: &Path, message: &str) -> Result<bool> {
        self.run("add", Some(repo), &["add", "--all"]).await?;

        if self
            .status("diff", repo, &["diff", "--cached", "--quiet"])
            .await?
        {
            return Ok(false);
        }

        self.run("commit", Some(repo), &["commit", "--message", message])
            .await?;
        Ok(true)
    }

    async fn push(&self, repo: &Path, url: &SecretString, branch: &str) -> Result<()> {
        let refspec = format!("refs/heads/{b}:refs/heads/{b}", b = branch);
        self.run("push", Some(repo), &["push", url.expose_secret(), &refspec])
            .await?;
        Ok(())
    }
}

/// Branch named by `ref: refs/heads/{branch}\tHEAD` in `ls-remote --symref` output
pub fn parse_symref_head(output: &str) -> Option<String> {
    output.lines().find_map(|line| {
        let rest = line.strip_prefix("ref:")?.trim_start();
        let (target, name) = rest.split_once('\t')?;
        if name.trim() != "HEAD" {
            return None;
        }
        let branch = target.strip_prefix("refs/heads/").unwrap_or(target);
        Some(branch.to_string())
    })
}

fn is_up_to_date(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    lower.contains("already up to date") || lower.contains("already up-to-date")
}

/// Replace `user:pass@` in URLs with `***@`
pub fn mask_userinfo(text: &str) -> String {
    let mut masked = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(idx) = rest.find("://") {
        let (head, tail) = rest.split_at(idx + 3);
        masked.push_str(head);
        let authority_end = tail
            .find(|c: char| c == '/' || c.is_whitespace() || c == '\'')
            .unwrap_or(tail.len());
        match tail[..authority_end].rfind('@') {
            Some(at) => {
                masked.push_str("***");
                rest = &tail[at..];
            }
            None => rest = tail,
        }
    }
    masked.push_str(rest);
    masked
}

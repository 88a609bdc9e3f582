//! Backend implementation shelling out to the `git` binary

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, trace};

use crate::{Error, Result};

use super::{BranchList, Git};

/// [`Git`] backend driving the `git` executable
#[derive(Debug, Clone)]
pub struct GitCli {
    git_path: String,
    workdir: PathBuf,
}

impl GitCli {
    /// Create a backend running git commands in the given working directory
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            git_path: "git".to_string(),
            workdir: workdir.into(),
        }
    }

    /// Use a custom git executable
    pub fn with_git_path(mut self, path: impl Into<String>) -> Self {
        self.git_path = path.into();
        self
    }

    /// The working directory commands run in
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(&self.git_path);
        cmd.args(args)
            .current_dir(&self.workdir)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }

    /// Run a git subcommand, returning stdout on success
    async fn run(&self, args: &[&str]) -> Result<String> {
        trace!(?args, "running git");

        let output = self.command(args).output().await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::Other(format!(
                    "git executable not found at '{}'. Is git installed?",
                    self.git_path
                ))
            } else {
                Error::Io(e)
            }
        })?;

        if !output.status.success() {
            return Err(Error::Command {
                command: args.join(" "),
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Paths currently carrying conflict markers
    async fn conflicted_files(&self) -> Result<Vec<String>> {
        let listing = self.run(&["diff", "--name-only", "--diff-filter=U"]).await?;
        Ok(listing
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Classify a failed merge/rebase: content conflicts are a distinct error
    /// from operational failures (which the synchronizer may retry)
    async fn classify_failure(&self, upstream: &str, failure: Error) -> Error {
        let files = match self.conflicted_files().await {
            Ok(files) => files,
            Err(_) => return failure,
        };
        if files.is_empty() {
            return failure;
        }

        let branch = match self.run(&["rev-parse", "--abbrev-ref", "HEAD"]).await {
            Ok(name) => name.trim().to_string(),
            Err(_) => "HEAD".to_string(),
        };

        Error::Conflict {
            branch,
            upstream: upstream.to_string(),
            files,
        }
    }
}

#[async_trait]
impl Git for GitCli {
    async fn checkout(&self, branch: &str) -> Result<()> {
        debug!(branch, "checkout");
        self.run(&["checkout", branch]).await?;
        Ok(())
    }

    async fn merge(&self, branch: &str) -> Result<()> {
        debug!(branch, "merge");
        match self.run(&["merge", branch]).await {
            Ok(_) => Ok(()),
            Err(failure) => Err(self.classify_failure(branch, failure).await),
        }
    }

    async fn rebase(&self, branch: &str) -> Result<()> {
        debug!(branch, "rebase");
        match self.run(&["rebase", branch]).await {
            Ok(_) => Ok(()),
            Err(failure) => Err(self.classify_failure(branch, failure).await),
        }
    }

    async fn push(&self, remote: &str, branches: &[String], force: bool) -> Result<()> {
        debug!(remote, ?branches, force, "push");
        let args = push_args(remote, branches, force);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        self.run(&args).await?;
        Ok(())
    }

    async fn local_branches(&self) -> Result<BranchList> {
        let listing = self
            .run(&["branch", "--list", "--format=%(HEAD) %(refname:short)"])
            .await?;
        Ok(parse_branch_listing(&listing))
    }

    async fn is_ancestor(&self, ancestor: &str, descendant: &str) -> Result<bool> {
        let args = ["merge-base", "--is-ancestor", ancestor, descendant];
        let output = self.command(&args).output().await.map_err(Error::Io)?;
        match output.status.code() {
            Some(0) => Ok(true),
            Some(1) => Ok(false),
            code => Err(Error::Command {
                command: args.join(" "),
                status: code.unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }),
        }
    }

    async fn raw(&self, args: &[&str]) -> Result<String> {
        self.run(args).await
    }
}

/// Arguments for the batch push call
fn push_args(remote: &str, branches: &[String], force: bool) -> Vec<String> {
    let mut args = vec!["push".to_string()];
    if force {
        args.push("--force".to_string());
    }
    args.push(remote.to_string());
    args.extend(branches.iter().cloned());
    args
}

/// Parse `git branch --list --format="%(HEAD) %(refname:short)"` output
fn parse_branch_listing(listing: &str) -> BranchList {
    let mut branches = BranchList::default();

    for line in listing.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }
        let (marker, name) = line.split_at(1);
        let name = name.trim();
        if name.is_empty() || name.starts_with('(') {
            // Detached HEAD placeholder
            continue;
        }
        if marker == "*" {
            branches.current = Some(name.to_string());
        }
        branches.all.push(name.to_string());
    }

    branches
}

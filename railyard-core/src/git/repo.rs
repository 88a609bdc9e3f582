//! Repository discovery via libgit2
//!
//! Only read-side lookups live here; anything that touches the working tree
//! goes through the [`super::Git`] trait.

use std::path::{Path, PathBuf};

use git2::Repository;

use crate::config::FALLBACK_BASE_BRANCH;
use crate::{Error, Result};

/// A discovered git repository
pub struct GitRepo {
    repo: Repository,
    root: PathBuf,
}

impl std::fmt::Debug for GitRepo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitRepo")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl GitRepo {
    /// Open the repository containing the given path
    ///
    /// Searches upward from the path to find the repository root.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let repo = Repository::discover(path).map_err(|e| {
            if e.code() == git2::ErrorCode::NotFound {
                Error::Config(format!("Not a git repository: {}", path.display()))
            } else {
                Error::Other(format!("Git error: {}", e))
            }
        })?;

        let root = repo
            .workdir()
            .ok_or_else(|| Error::Config("Bare repositories are not supported".to_string()))?
            .to_path_buf();

        Ok(Self { repo, root })
    }

    /// The repository root (where `.railyard.toml` lives)
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether the given path is inside a git repository
    pub fn is_git_repo(path: impl AsRef<Path>) -> bool {
        Repository::discover(path.as_ref()).is_ok()
    }

    /// The checked-out branch, or `None` when HEAD is detached or unborn
    pub fn current_branch(&self) -> Result<Option<String>> {
        let head = match self.repo.head() {
            Ok(head) => head,
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => return Ok(None),
            Err(e) => return Err(Error::Other(format!("Failed to read HEAD: {}", e))),
        };

        if head.is_branch() {
            Ok(head.shorthand().map(str::to_string))
        } else {
            Ok(None)
        }
    }

    /// The repository's default branch name
    ///
    /// Scans the usual suspects (remote-tracking first, then local) and falls
    /// back to [`FALLBACK_BASE_BRANCH`] when none of them exist.
    pub fn default_branch(&self) -> String {
        let candidates = [
            ("refs/remotes/origin/main", "main"),
            ("refs/remotes/origin/master", "master"),
            ("refs/heads/main", "main"),
            ("refs/heads/master", "master"),
        ];

        for (reference, name) in candidates {
            if self.repo.find_reference(reference).is_ok() {
                return name.to_string();
            }
        }

        FALLBACK_BASE_BRANCH.to_string()
    }

    /// URL of the named remote
    pub fn remote_url(&self, remote: &str) -> Result<String> {
        let found = self.repo.find_remote(remote).map_err(|_| {
            Error::Remote(format!("Remote {:?} not found in your git config", remote))
        })?;

        found
            .url()
            .map(str::to_string)
            .ok_or_else(|| Error::Remote(format!("Remote {:?} has no usable URL", remote)))
    }
}

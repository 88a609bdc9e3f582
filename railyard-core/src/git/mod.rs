//! Version-control backend for Railyard
//!
//! All mutation of the working tree goes through the narrow [`Git`] trait; the
//! production implementation ([`GitCli`]) shells out to the `git` binary.
//! Read-only repository discovery (root, remote URL) is handled by [`GitRepo`]
//! on top of libgit2.

mod cli;
mod repo;

pub use cli::GitCli;
pub use repo::GitRepo;

use async_trait::async_trait;

use crate::Result;

/// Local branch listing
#[derive(Debug, Clone, Default)]
pub struct BranchList {
    /// The checked-out branch, if HEAD is not detached
    pub current: Option<String>,
    /// All local branch names
    pub all: Vec<String>,
}

/// Narrow interface to the version-control backend
///
/// Calls are issued strictly in sequence; the working-tree checkout is the one
/// shared mutable resource and is only ever moved through [`Git::checkout`].
#[async_trait]
pub trait Git: Send + Sync {
    /// Check out the given branch
    async fn checkout(&self, branch: &str) -> Result<()>;

    /// Merge `branch` into the current checkout
    ///
    /// A failure with content conflicts surfaces as [`crate::Error::Conflict`]
    /// carrying the conflicted paths; the working tree is left as git left it.
    async fn merge(&self, branch: &str) -> Result<()>;

    /// Rebase the current checkout onto `branch`
    async fn rebase(&self, branch: &str) -> Result<()>;

    /// Push the given branches to `remote` in a single invocation
    async fn push(&self, remote: &str, branches: &[String], force: bool) -> Result<()>;

    /// List local branches and the current checkout
    async fn local_branches(&self) -> Result<BranchList>;

    /// Whether `ancestor` is an ancestor of (or equal to) `descendant`
    async fn is_ancestor(&self, ancestor: &str, descendant: &str) -> Result<bool>;

    /// Run a raw git subcommand and return its stdout
    async fn raw(&self, args: &[&str]) -> Result<String>;
}

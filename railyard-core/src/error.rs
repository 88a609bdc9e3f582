//! Error types for Railyard

use thiserror::Error;

/// Result type alias for Railyard operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for Railyard operations
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error (file missing, unparseable, or the current branch
    /// is not part of any train)
    #[error("Configuration error: {0}")]
    Config(String),

    /// A merge or rebase produced real content conflicts. The working tree is
    /// left in the conflicted state for manual resolution.
    #[error("Merge conflict between {upstream} and {branch} ({} conflicted files)", .files.len())]
    Conflict {
        /// The branch that was being updated
        branch: String,
        /// The branch whose changes were being brought in
        upstream: String,
        /// Paths with conflict markers
        files: Vec<String>,
    },

    /// A git invocation failed for a non-conflict reason
    #[error("git {command} failed with status {status}: {stderr}")]
    Command {
        /// The subcommand and arguments that were run
        command: String,
        /// Process exit status
        status: i32,
        /// Captured standard error
        stderr: String,
    },

    /// Remote configuration error (remote URL missing or unparseable)
    #[error("Remote configuration error: {0}")]
    Remote(String),

    /// A branch-switch token did not resolve to a branch in the train
    #[error("No branch for switch target {0:?}")]
    SwitchTarget(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

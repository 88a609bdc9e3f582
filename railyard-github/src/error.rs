//! Error types for GitHub operations

use thiserror::Error;

/// Result type for GitHub operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reconciling pull requests
#[derive(Error, Debug)]
pub enum Error {
    /// GitHub API error, surfaced with the host's diagnostic payload
    #[error("GitHub API error: {0}")]
    Api(#[from] octocrab::Error),

    /// Authentication error (token missing or rejected)
    #[error("GitHub authentication error: {0}")]
    Auth(String),

    /// The remote URL could not be parsed as a GitHub repository
    #[error("Could not parse remote URL: {0}")]
    RemoteParse(String),

    /// PR creation failed because the base branch is unknown to the remote
    #[error("Base branch {base:?} does not exist on the remote. Did you forget to push it?")]
    BaseBranchMissing {
        /// The base ref the host rejected
        base: String,
    },

    /// A combined branch is configured but no PR title was supplied for it
    #[error("A title for the combined branch PR is required")]
    MissingCombinedTitle,

    /// Error from the version-control backend
    #[error(transparent)]
    Core(#[from] railyard_core::Error),
}

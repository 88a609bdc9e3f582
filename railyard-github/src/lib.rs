//! Railyard GitHub — pull-request integration for branch trains
//!
//! Mirrors a train's branches into a set of linked pull requests: one PR per
//! branch with the right base, plus a navigation block cross-linking the whole
//! train, kept up to date on every run.

pub mod auth;
mod client;
mod error;
mod host;
pub mod navigation;
pub mod reconcile;

pub use client::GitHubClient;
pub use error::{Error, Result};
pub use host::{HostPullRequest, NewPullRequest, PullRequestHost};
pub use reconcile::{reconcile_train, PullRequestRecord, ReconcileSettings};

//! Railyard core — the branch-train model and its synchronization engine
//!
//! A "train" is an ordered chain of dependent branches. This crate discovers
//! the train containing the current checkout, propagates each branch into the
//! next (merge or rebase), and plans pushes to the remote. The GitHub side
//! lives in `railyard-github`.

pub mod config;
pub mod error;
pub mod git;
pub mod push;
pub mod sync;
pub mod train;

pub use config::{PrsConfig, SyncConfig, TrainsFile, CONFIG_FILE_NAME, FALLBACK_BASE_BRANCH};
pub use error::{Error, Result};
pub use git::{BranchList, Git, GitCli, GitRepo};
pub use push::{plan_push, push_branches, PushPlan};
pub use sync::{sync_train, StepOutcome, SyncMode, SyncSettings};
pub use train::{resolve_current_train, BranchSpec, Train};

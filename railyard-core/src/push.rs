//! Push planning
//!
//! Decides which train branches still need pushing (branches already merged
//! into the base branch are excluded unless asked for) and pushes them in one
//! batch call.

use tracing::{debug, info};

use crate::git::Git;
use crate::Result;

/// The branches to push and the ones excluded as already merged
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PushPlan {
    /// Branches that will be pushed
    pub to_push: Vec<String>,
    /// Branches excluded because their tip is already contained in the base
    pub skipped_merged: Vec<String>,
}

/// Select the branches that need pushing
///
/// A branch counts as merged when its tip is an ancestor of `base`. With
/// `push_merged` set, no filtering happens and every branch is pushed.
pub async fn plan_push(
    git: &dyn Git,
    branches: &[String],
    base: &str,
    push_merged: bool,
) -> Result<PushPlan> {
    if push_merged {
        return Ok(PushPlan {
            to_push: branches.to_vec(),
            skipped_merged: Vec::new(),
        });
    }

    let mut plan = PushPlan::default();
    for branch in branches {
        if git.is_ancestor(branch, base).await? {
            debug!(%branch, base, "already merged into base");
            plan.skipped_merged.push(branch.clone());
        } else {
            plan.to_push.push(branch.clone());
        }
    }

    if !plan.skipped_merged.is_empty() {
        info!(
            skipped = ?plan.skipped_merged,
            "not pushing branches already merged into {}", base
        );
    }

    Ok(plan)
}

/// Push the planned branches to the remote in a single batch call
///
/// A push failure is fatal; the backend is not retried here.
pub async fn push_branches(
    git: &dyn Git,
    remote: &str,
    plan: &PushPlan,
    force: bool,
) -> Result<()> {
    if plan.to_push.is_empty() {
        info!(remote, "nothing to push");
        return Ok(());
    }

    info!(remote, branches = ?plan.to_push, force, "pushing");
    git.push(remote, &plan.to_push, force).await
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::git::BranchList;
    use crate::Error;

    use super::*;

    #[derive(Default)]
    struct MockGit {
        merged: HashSet<String>,
        pushes: Mutex<Vec<(String, Vec<String>, bool)>>,
    }

    impl MockGit {
        fn with_merged(branches: &[&str]) -> Self {
            Self {
                merged: branches.iter().map(|b| b.to_string()).collect(),
                pushes: Mutex::default(),
            }
        }
    }

    #[async_trait]
    impl Git for MockGit {
        async fn checkout(&self, _branch: &str) -> Result<()> {
            Ok(())
        }

        async fn merge(&self, _branch: &str) -> Result<()> {
            Ok(())
        }

        async fn rebase(&self, _branch: &str) -> Result<()> {
            Ok(())
        }

        async fn push(&self, remote: &str, branches: &[String], force: bool) -> Result<()> {
            self.pushes
                .lock()
                .unwrap()
                .push((remote.to_string(), branches.to_vec(), force));
            Ok(())
        }

        async fn local_branches(&self) -> Result<BranchList> {
            Ok(BranchList::default())
        }

        async fn is_ancestor(&self, ancestor: &str, descendant: &str) -> Result<bool> {
            // Only the merged-into-base query reaches this mock
            assert_eq!(descendant, "main");
            Ok(self.merged.contains(ancestor))
        }

        async fn raw(&self, _args: &[&str]) -> Result<String> {
            Err(Error::Other("not used".to_string()))
        }
    }

    fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    // Branches already merged into the base are excluded and reported.
    #[tokio::test]
    async fn test_plan_excludes_merged_branches() {
        let git = MockGit::with_merged(&["b"]);
        let plan = plan_push(&git, &names(&["a", "b", "c"]), "main", false)
            .await
            .unwrap();

        assert_eq!(plan.to_push, vec!["a", "c"]);
        assert_eq!(plan.skipped_merged, vec!["b"]);
    }

    #[tokio::test]
    async fn test_plan_push_merged_keeps_everything() {
        let git = MockGit::with_merged(&["b"]);
        let plan = plan_push(&git, &names(&["a", "b", "c"]), "main", true)
            .await
            .unwrap();

        assert_eq!(plan.to_push, vec!["a", "b", "c"]);
        assert!(plan.skipped_merged.is_empty());
    }

    #[tokio::test]
    async fn test_push_is_one_batch_call() {
        let git = MockGit::default();
        let plan = PushPlan {
            to_push: names(&["a", "c"]),
            skipped_merged: Vec::new(),
        };
        push_branches(&git, "origin", &plan, true).await.unwrap();

        let pushes = git.pushes.lock().unwrap();
        assert_eq!(pushes.len(), 1);
        assert_eq!(
            *pushes,
            vec![("origin".to_string(), names(&["a", "c"]), true)]
        );
    }

    #[tokio::test]
    async fn test_empty_plan_pushes_nothing() {
        let git = MockGit::default();
        push_branches(&git, "origin", &PushPlan::default(), false)
            .await
            .unwrap();
        assert!(git.pushes.lock().unwrap().is_empty());
    }
}

//! The branch-train model
//!
//! A train is an ordered chain of dependent branches; each branch's changes are
//! propagated into the next one. An optional "combined" branch sits at the end
//! of the chain and accumulates every other branch's changes without being a
//! prerequisite of any of them.

use serde::Serialize;

use crate::{Error, Result};

/// One branch of a train, in uniform form
///
/// Config entries (bare names or one-key annotated tables) are resolved into
/// this struct once at load time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BranchSpec {
    /// Branch name, resolvable by the version-control backend
    pub name: String,
    /// Whether this is the train's combined (integration) branch
    pub combined: bool,
    /// Commit the branch was originally created from
    pub init_sha: Option<String>,
}

impl BranchSpec {
    /// A plain, unannotated branch
    pub fn plain(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            combined: false,
            init_sha: None,
        }
    }
}

/// An ordered chain of dependent branches
#[derive(Debug, Clone)]
pub struct Train {
    key: String,
    branches: Vec<BranchSpec>,
}

impl Train {
    /// Build and validate a train
    ///
    /// Rejects empty trains, duplicate branch names, more than one combined
    /// branch, and a combined branch anywhere but the final position.
    pub fn new(key: String, branches: Vec<BranchSpec>) -> Result<Self> {
        if branches.is_empty() {
            return Err(Error::Config(format!("Train {:?} has no branches", key)));
        }

        for (i, spec) in branches.iter().enumerate() {
            if branches[..i].iter().any(|b| b.name == spec.name) {
                return Err(Error::Config(format!(
                    "Train {:?} lists branch {:?} more than once",
                    key, spec.name
                )));
            }
        }

        let combined_count = branches.iter().filter(|b| b.combined).count();
        if combined_count > 1 {
            return Err(Error::Config(format!(
                "Train {:?} has {} combined branches, at most one is allowed",
                key, combined_count
            )));
        }
        if let Some(position) = branches.iter().position(|b| b.combined) {
            if position != branches.len() - 1 {
                return Err(Error::Config(format!(
                    "Combined branch {:?} must be the last entry of train {:?}",
                    branches[position].name, key
                )));
            }
        }

        Ok(Self { key, branches })
    }

    /// The train's key in the config file
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Branch specs in chain order
    pub fn branches(&self) -> &[BranchSpec] {
        &self.branches
    }

    /// Branch names in chain order (the combined branch last, if present)
    pub fn branch_names(&self) -> Vec<&str> {
        self.branches.iter().map(|b| b.name.as_str()).collect()
    }

    /// Whether the train contains the given branch
    pub fn contains(&self, branch: &str) -> bool {
        self.branches.iter().any(|b| b.name == branch)
    }

    /// The combined branch, if the train has one
    pub fn combined_branch(&self) -> Option<&str> {
        self.branches
            .iter()
            .find(|b| b.combined)
            .map(|b| b.name.as_str())
    }

    /// The branch right before the combined branch
    ///
    /// This is the branch a missing combined branch is created from.
    pub fn last_before_combined(&self) -> Option<&str> {
        let position = self.branches.iter().position(|b| b.combined)?;
        position
            .checked_sub(1)
            .map(|i| self.branches[i].name.as_str())
    }

    /// Resolve a branch-switch token to a branch of this train
    ///
    /// `"combined"` names the combined branch; a numeric token indexes into the
    /// ordered branch list. Anything else, an out-of-bounds index, or
    /// `"combined"` without a configured combined branch fails with
    /// [`Error::SwitchTarget`].
    pub fn resolve_switch_target(&self, token: &str) -> Result<&str> {
        if token == "combined" {
            return self
                .combined_branch()
                .ok_or_else(|| Error::SwitchTarget(token.to_string()));
        }

        let index: usize = token
            .parse()
            .map_err(|_| Error::SwitchTarget(token.to_string()))?;
        self.branches
            .get(index)
            .map(|b| b.name.as_str())
            .ok_or_else(|| Error::SwitchTarget(token.to_string()))
    }
}

/// Find the train the current branch belongs to
///
/// Trains are scanned in the order given (config key order); when the branch
/// appears in more than one train, the first match wins.
pub fn resolve_current_train<'a>(trains: &'a [Train], current_branch: &str) -> Option<&'a Train> {
    trains.iter().find(|t| t.contains(current_branch))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn train(key: &str, names: &[&str], combined: Option<&str>) -> Train {
        let branches = names
            .iter()
            .map(|n| BranchSpec {
                name: n.to_string(),
                combined: combined == Some(*n),
                init_sha: None,
            })
            .collect();
        Train::new(key.to_string(), branches).unwrap()
    }

    #[test]
    fn test_empty_train_rejected() {
        assert!(Train::new("t".to_string(), vec![]).is_err());
    }

    #[test]
    fn test_duplicate_branch_rejected() {
        let result = Train::new(
            "t".to_string(),
            vec![BranchSpec::plain("a"), BranchSpec::plain("a")],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_two_combined_branches_rejected() {
        let branches = vec![
            BranchSpec {
                name: "a".to_string(),
                combined: true,
                init_sha: None,
            },
            BranchSpec {
                name: "b".to_string(),
                combined: true,
                init_sha: None,
            },
        ];
        assert!(Train::new("t".to_string(), branches).is_err());
    }

    #[test]
    fn test_combined_must_be_last() {
        let branches = vec![
            BranchSpec {
                name: "a".to_string(),
                combined: true,
                init_sha: None,
            },
            BranchSpec::plain("b"),
        ];
        assert!(Train::new("t".to_string(), branches).is_err());
    }

    #[test]
    fn test_resolve_current_train() {
        let trains = vec![train("one", &["a", "b"], None), train("two", &["c"], None)];
        assert_eq!(resolve_current_train(&trains, "c").unwrap().key(), "two");
        assert!(resolve_current_train(&trains, "missing").is_none());
    }

    // Pins the ambiguity rule: first train in key order wins.
    #[test]
    fn test_resolve_prefers_first_train_in_key_order() {
        let trains = vec![
            train("alpha", &["shared", "a"], None),
            train("beta", &["shared", "b"], None),
        ];
        assert_eq!(resolve_current_train(&trains, "shared").unwrap().key(), "alpha");
    }

    #[test]
    fn test_last_before_combined() {
        let t = train("t", &["a", "b", "z"], Some("z"));
        assert_eq!(t.last_before_combined(), Some("b"));

        let no_combined = train("t", &["a", "b"], None);
        assert_eq!(no_combined.last_before_combined(), None);
    }

    #[test]
    fn test_switch_target_combined() {
        let t = train("t", &["a", "b", "z"], Some("z"));
        assert_eq!(t.resolve_switch_target("combined").unwrap(), "z");
    }

    #[test]
    fn test_switch_target_combined_without_combined_branch() {
        let t = train("t", &["a", "b"], None);
        assert!(matches!(
            t.resolve_switch_target("combined"),
            Err(Error::SwitchTarget(_))
        ));
    }

    #[test]
    fn test_switch_target_index() {
        let t = train("t", &["a", "b"], None);
        assert_eq!(t.resolve_switch_target("0").unwrap(), "a");
        assert_eq!(t.resolve_switch_target("1").unwrap(), "b");
    }

    #[test]
    fn test_switch_target_out_of_bounds() {
        let t = train("t", &["a", "b"], None);
        assert!(matches!(
            t.resolve_switch_target("2"),
            Err(Error::SwitchTarget(_))
        ));
    }

    #[test]
    fn test_switch_target_garbage_token() {
        let t = train("t", &["a", "b"], None);
        assert!(t.resolve_switch_target("not-a-number").is_err());
    }
}

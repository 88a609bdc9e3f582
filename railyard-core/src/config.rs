//! Configuration for Railyard
//!
//! A repository opts into Railyard with a `.railyard.toml` file at its root:
//!
//! ```toml
//! [trains]
//! big-feature = [
//!     "fred/feature/part-1",
//!     "fred/feature/part-2",
//!     { "fred/feature/combined" = { combined = true } },
//! ]
//!
//! [prs]
//! main-branch-name = "develop"
//! draft-by-default = true
//! ```
//!
//! A train entry is either a bare branch name or a one-key table annotating the
//! branch; both forms resolve to [`BranchSpec`] at load time.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::train::{BranchSpec, Train};
use crate::{Error, Result};

/// File name looked up at the repository root
pub const CONFIG_FILE_NAME: &str = ".railyard.toml";

/// Base branch used when neither the config nor repository discovery names one
pub const FALLBACK_BASE_BRANCH: &str = "master";

/// Attributes of an annotated train entry
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BranchAttrs {
    /// Whether this is the train's combined (integration) branch
    pub combined: bool,

    /// Commit the branch was originally created from
    #[serde(alias = "initSha", skip_serializing_if = "Option::is_none")]
    pub init_sha: Option<String>,
}

/// A raw train entry as written in the config file
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum BranchEntry {
    /// Bare branch name
    Plain(String),
    /// One-key table: branch name mapped to its attributes
    Annotated(BTreeMap<String, BranchAttrs>),
}

impl BranchEntry {
    /// Resolve the raw entry into the uniform internal representation
    pub fn resolve(&self) -> Result<BranchSpec> {
        match self {
            BranchEntry::Plain(name) => Ok(BranchSpec::plain(name)),
            BranchEntry::Annotated(map) => {
                if map.len() != 1 {
                    return Err(Error::Config(format!(
                        "Annotated train entry must have exactly one branch name, found {}",
                        map.len()
                    )));
                }
                let (name, attrs) = map.iter().next().ok_or_else(|| {
                    Error::Config("Annotated train entry is empty".to_string())
                })?;
                Ok(BranchSpec {
                    name: name.clone(),
                    combined: attrs.combined,
                    init_sha: attrs.init_sha.clone(),
                })
            }
        }
    }

    /// The branch name regardless of entry form
    pub fn branch_name(&self) -> Option<&str> {
        match self {
            BranchEntry::Plain(name) => Some(name),
            BranchEntry::Annotated(map) => map.keys().next().map(String::as_str),
        }
    }
}

/// Pull-request options
///
/// Every key accepts both its kebab-case and camelCase spelling.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PrsConfig {
    /// Base branch for the first and the combined PR
    #[serde(alias = "mainBranchName", skip_serializing_if = "Option::is_none")]
    pub main_branch_name: Option<String>,

    /// Create new PRs as drafts unless overridden on the command line
    #[serde(alias = "draftByDefault")]
    pub draft_by_default: bool,

    /// Print each PR's URL after reconciliation
    #[serde(alias = "printUrls")]
    pub print_urls: bool,
}

/// Chain-synchronization pacing
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SyncConfig {
    /// Pause after each successful chain step, letting index locks settle
    #[serde(with = "humantime_serde", alias = "stepDelay")]
    pub step_delay: Duration,

    /// Pause before the single retry of a step that failed without conflicts
    #[serde(with = "humantime_serde", alias = "lockRetryDelay")]
    pub lock_retry_delay: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            step_delay: Duration::from_millis(500),
            lock_retry_delay: Duration::from_millis(1500),
        }
    }
}

/// The `.railyard.toml` structure
///
/// Loaded once per invocation and treated as read-only, except for the
/// branch-insertion path which rewrites the file atomically.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TrainsFile {
    /// Train key to ordered branch entries
    pub trains: BTreeMap<String, Vec<BranchEntry>>,

    /// Pull-request options
    pub prs: PrsConfig,

    /// Synchronization pacing
    pub sync: SyncConfig,
}

impl TrainsFile {
    /// Path of the config file under a repository root
    pub fn path_in(repo_root: &Path) -> PathBuf {
        repo_root.join(CONFIG_FILE_NAME)
    }

    /// Load the config from a repository root
    pub fn load(repo_root: &Path) -> Result<Self> {
        let path = Self::path_in(repo_root);
        if !path.exists() {
            return Err(Error::Config(format!(
                "No {} found at {}",
                CONFIG_FILE_NAME,
                repo_root.display()
            )));
        }
        Self::load_from_file(&path)
    }

    /// Load the config from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }

    /// Resolve and validate every configured train, in key order
    pub fn resolve_trains(&self) -> Result<Vec<Train>> {
        self.trains
            .iter()
            .map(|(key, entries)| {
                let specs = entries
                    .iter()
                    .map(BranchEntry::resolve)
                    .collect::<Result<Vec<_>>>()?;
                Train::new(key.clone(), specs)
            })
            .collect()
    }

    /// The explicitly chosen base branch: CLI override first, then the config
    ///
    /// `None` leaves the choice to repository discovery
    /// ([`crate::GitRepo::default_branch`]).
    pub fn base_branch(&self, cli_override: Option<&str>) -> Option<String> {
        cli_override
            .map(str::to_string)
            .or_else(|| self.prs.main_branch_name.clone())
    }

    /// Insert a plain branch entry right after `after` in the given train
    pub fn insert_branch_after(&mut self, train_key: &str, after: &str, new_branch: &str) -> Result<()> {
        let entries = self.trains.get_mut(train_key).ok_or_else(|| {
            Error::Config(format!("No train named {:?} in config", train_key))
        })?;

        if entries
            .iter()
            .any(|e| e.branch_name() == Some(new_branch))
        {
            return Err(Error::Config(format!(
                "Branch {:?} is already part of train {:?}",
                new_branch, train_key
            )));
        }

        let position = entries
            .iter()
            .position(|e| e.branch_name() == Some(after))
            .ok_or_else(|| {
                Error::Config(format!(
                    "Branch {:?} is not part of train {:?}",
                    after, train_key
                ))
            })?;

        entries.insert(position + 1, BranchEntry::Plain(new_branch.to_string()));
        Ok(())
    }

    /// Write the config back atomically (write a sibling temp file, then rename)
    pub fn save(&self, path: &Path) -> Result<()> {
        let rendered = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

        let tmp = path.with_extension("toml.tmp");
        std::fs::write(&tmp, rendered).map_err(Error::Io)?;
        std::fs::rename(&tmp, path).map_err(Error::Io)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[trains]
big-feature = [
    "fred/feature/part-1",
    "fred/feature/part-2",
    { "fred/feature/combined" = { combined = true } },
]

[prs]
main-branch-name = "develop"
draft-by-default = true
"#;

    #[test]
    fn test_parse_plain_and_annotated_entries() {
        let cfg: TrainsFile = toml::from_str(SAMPLE).unwrap();
        let trains = cfg.resolve_trains().unwrap();
        assert_eq!(trains.len(), 1);

        let train = &trains[0];
        assert_eq!(train.key(), "big-feature");
        assert_eq!(
            train.branch_names(),
            vec![
                "fred/feature/part-1",
                "fred/feature/part-2",
                "fred/feature/combined"
            ]
        );
        assert_eq!(train.combined_branch(), Some("fred/feature/combined"));
    }

    #[test]
    fn test_parse_init_sha() {
        let cfg: TrainsFile = toml::from_str(
            r#"
[trains]
t = [{ "a" = { init-sha = "abc123" } }]
"#,
        )
        .unwrap();
        let spec = cfg.trains["t"][0].resolve().unwrap();
        assert_eq!(spec.name, "a");
        assert!(!spec.combined);
        assert_eq!(spec.init_sha.as_deref(), Some("abc123"));
    }

    #[test]
    fn test_prs_keys_accept_both_cases() {
        let kebab: TrainsFile = toml::from_str(
            r#"
[prs]
main-branch-name = "develop"
draft-by-default = true
print-urls = true
"#,
        )
        .unwrap();
        let camel: TrainsFile = toml::from_str(
            r#"
[prs]
mainBranchName = "develop"
draftByDefault = true
printUrls = true
"#,
        )
        .unwrap();

        for cfg in [kebab, camel] {
            assert_eq!(cfg.prs.main_branch_name.as_deref(), Some("develop"));
            assert!(cfg.prs.draft_by_default);
            assert!(cfg.prs.print_urls);
        }
    }

    #[test]
    fn test_sync_delay_defaults_and_overrides() {
        let cfg: TrainsFile = toml::from_str("").unwrap();
        assert_eq!(cfg.sync.step_delay, Duration::from_millis(500));
        assert_eq!(cfg.sync.lock_retry_delay, Duration::from_millis(1500));

        let cfg: TrainsFile = toml::from_str(
            r#"
[sync]
step-delay = "50ms"
lock-retry-delay = "2s"
"#,
        )
        .unwrap();
        assert_eq!(cfg.sync.step_delay, Duration::from_millis(50));
        assert_eq!(cfg.sync.lock_retry_delay, Duration::from_secs(2));
    }

    #[test]
    fn test_base_branch_priority() {
        let cfg: TrainsFile = toml::from_str(SAMPLE).unwrap();
        assert_eq!(cfg.base_branch(Some("release")).as_deref(), Some("release"));
        assert_eq!(cfg.base_branch(None).as_deref(), Some("develop"));

        let bare: TrainsFile = toml::from_str("").unwrap();
        assert_eq!(bare.base_branch(None), None);
    }

    #[test]
    fn test_annotated_entry_with_multiple_keys_rejected() {
        let cfg: TrainsFile = toml::from_str(
            r#"
[trains]
t = [{ a = { combined = true }, b = { combined = false } }]
"#,
        )
        .unwrap();
        assert!(cfg.resolve_trains().is_err());
    }

    #[test]
    fn test_insert_branch_after() {
        let mut cfg: TrainsFile = toml::from_str(SAMPLE).unwrap();
        cfg.insert_branch_after("big-feature", "fred/feature/part-1", "fred/feature/part-1b")
            .unwrap();

        let train = &cfg.resolve_trains().unwrap()[0];
        assert_eq!(
            train.branch_names(),
            vec![
                "fred/feature/part-1",
                "fred/feature/part-1b",
                "fred/feature/part-2",
                "fred/feature/combined"
            ]
        );
    }

    #[test]
    fn test_insert_duplicate_rejected() {
        let mut cfg: TrainsFile = toml::from_str(SAMPLE).unwrap();
        let result =
            cfg.insert_branch_after("big-feature", "fred/feature/part-1", "fred/feature/part-2");
        assert!(result.is_err());
    }

    #[test]
    fn test_save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);

        let mut cfg: TrainsFile = toml::from_str(SAMPLE).unwrap();
        cfg.insert_branch_after("big-feature", "fred/feature/part-2", "fred/feature/part-3")
            .unwrap();
        cfg.save(&path).unwrap();

        let reloaded = TrainsFile::load_from_file(&path).unwrap();
        let train = &reloaded.resolve_trains().unwrap()[0];
        assert!(train.branch_names().contains(&"fred/feature/part-3"));
        assert_eq!(reloaded.prs.main_branch_name.as_deref(), Some("develop"));
        // No temp file left behind
        assert!(!path.with_extension("toml.tmp").exists());
    }

    #[test]
    fn test_missing_config_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = TrainsFile::load(dir.path()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}

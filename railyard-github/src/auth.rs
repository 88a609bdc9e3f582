//! GitHub token lookup
//!
//! The token is deliberately kept out of `.railyard.toml`, which lives inside
//! the repository and may be shared. It comes from the environment or from a
//! private token file holding nothing but the token itself:
//! 1. `GITHUB_TOKEN` environment variable
//! 2. `~/.config/railyard/token`

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{Error, Result};

/// Resolve the GitHub token
///
/// A missing token is an [`Error::Auth`] with a remediation hint; an existing
/// but empty token file is reported as such rather than falling through.
pub fn github_token() -> Result<String> {
    if let Ok(token) = std::env::var("GITHUB_TOKEN") {
        let token = token.trim();
        if !token.is_empty() {
            debug!("using GitHub token from GITHUB_TOKEN");
            return Ok(token.to_string());
        }
    }

    if let Some(path) = token_file_path() {
        if let Some(token) = read_token_file(&path)? {
            debug!(path = %path.display(), "using GitHub token from token file");
            return Ok(token);
        }
    }

    Err(Error::Auth(
        "GitHub token not found. Set GITHUB_TOKEN or write the token to \
         ~/.config/railyard/token"
            .to_string(),
    ))
}

/// Default token file location (`~/.config/railyard/token`)
pub fn token_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("railyard").join("token"))
}

fn read_token_file(path: &Path) -> Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(path).map_err(|e| {
        Error::Auth(format!(
            "Could not read token file {}: {}",
            path.display(),
            e
        ))
    })?;

    let token = contents.trim();
    if token.is_empty() {
        return Err(Error::Auth(format!(
            "Token file {} is empty",
            path.display()
        )));
    }

    Ok(Some(token.to_string()))
}

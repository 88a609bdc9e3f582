//! Run errors and their process exit codes

use thiserror::Error;

/// Any failure of a railyard run
#[derive(Error, Debug)]
pub enum RunError {
    /// Error from the core engine or the git backend
    #[error(transparent)]
    Core(#[from] railyard_core::Error),

    /// Error from the PR host integration
    #[error(transparent)]
    GitHub(#[from] railyard_github::Error),
}

impl RunError {
    /// The process exit code this failure maps to
    ///
    /// 1 covers configuration problems and everything operational (conflicts,
    /// failed commands); 3 is an unresolvable branch-switch token; 4 is a
    /// remote/credential problem; 5 is a missing combined-branch PR title.
    /// 2 is reserved.
    pub fn exit_code(&self) -> i32 {
        match self {
            RunError::Core(err) => core_exit_code(err),
            RunError::GitHub(err) => match err {
                railyard_github::Error::Auth(_) | railyard_github::Error::RemoteParse(_) => 4,
                railyard_github::Error::MissingCombinedTitle => 5,
                railyard_github::Error::Core(inner) => core_exit_code(inner),
                _ => 1,
            },
        }
    }
}

fn core_exit_code(err: &railyard_core::Error) -> i32 {
    match err {
        railyard_core::Error::SwitchTarget(_) => 3,
        railyard_core::Error::Remote(_) => 4,
        _ => 1,
    }
}

impl From<std::io::Error> for RunError {
    fn from(err: std::io::Error) -> Self {
        RunError::Core(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors_exit_1() {
        let err = RunError::Core(railyard_core::Error::Config("no train".to_string()));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_switch_target_exits_3() {
        let err = RunError::Core(railyard_core::Error::SwitchTarget("7".to_string()));
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_remote_and_auth_exit_4() {
        let remote = RunError::Core(railyard_core::Error::Remote("no origin".to_string()));
        assert_eq!(remote.exit_code(), 4);

        let auth = RunError::GitHub(railyard_github::Error::Auth("no token".to_string()));
        assert_eq!(auth.exit_code(), 4);
    }

    #[test]
    fn test_missing_combined_title_exits_5() {
        let err = RunError::GitHub(railyard_github::Error::MissingCombinedTitle);
        assert_eq!(err.exit_code(), 5);
    }

    #[test]
    fn test_wrapped_core_error_keeps_its_code() {
        let err = RunError::GitHub(railyard_github::Error::Core(
            railyard_core::Error::Remote("gone".to_string()),
        ));
        assert_eq!(err.exit_code(), 4);
    }
}

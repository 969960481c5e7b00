//! Errors surfaced at the service boundary.
//!
//! Adapters and candidates work with [`anyhow::Result`] internally and never
//! let failures escape; only the three caller-facing operations translate
//! problems into a [`GameScanError`], which in turn becomes an
//! [`ErrorResponse`](crate::model::ErrorResponse).

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GameScanError {
    #[error("No games found matching '{0}'")]
    NoMatch(String),

    #[error("Game '{0}' not found")]
    NotFound(String),

    #[error("No executable found for '{0}'")]
    NoExecutable(String),

    #[error("Executable no longer exists: {}", .0.display())]
    ExecutableMissing(PathBuf),

    #[error("Failed to launch {}: {source}", path.display())]
    Launch {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, GameScanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_match_message() {
        let err = GameScanError::NoMatch("doom".to_string());
        assert_eq!(err.to_string(), "No games found matching 'doom'");
    }

    #[test]
    fn test_executable_missing_message() {
        let err = GameScanError::ExecutableMissing(PathBuf::from("/games/x/x.exe"));
        assert_eq!(err.to_string(), "Executable no longer exists: /games/x/x.exe");
    }
}

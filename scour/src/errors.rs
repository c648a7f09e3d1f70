use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while configuring or running a search.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type SearchResult<T> = Result<T, SearchError>;

impl SearchError {
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        SearchError::FileNotFound(path.into())
    }

    pub fn permission_denied(path: impl Into<PathBuf>) -> Self {
        SearchError::PermissionDenied(path.into())
    }

    pub fn invalid_pattern(msg: impl Into<String>) -> Self {
        SearchError::InvalidPattern(msg.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        SearchError::ConfigError(msg.into())
    }

    /// Classifies an I/O error against the path it occurred on.
    pub fn from_io(path: &Path, err: std::io::Error) -> Self {
        match err.kind() {
            ErrorKind::NotFound => SearchError::file_not_found(path),
            ErrorKind::PermissionDenied => SearchError::permission_denied(path),
            _ => SearchError::IoError(err),
        }
    }
}

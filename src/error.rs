//! Error types for the list engine and its matchers.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building, reloading or watching an IP list.
#[derive(Debug, Error)]
pub enum ListError {
    /// The directory that should contain the list file does not exist.
    #[error("could not find the directory containing the IP file to monitor: {}", path.display())]
    DirectoryMissing { path: PathBuf },

    /// The configured path does not name a file (e.g. `/` or `dir/..`).
    #[error("IP list path does not name a file: {}", path.display())]
    InvalidPath { path: PathBuf },

    /// The list file exists but could not be opened.
    #[error("error opening the IP list file {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading the list file failed part way through.
    #[error("error reading the IPs from {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The filesystem watcher could not be created or attached.
    #[error("file watcher error: {0}")]
    Watch(#[from] notify::Error),
}

/// Errors raised by connection matchers.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("invalid remote IP address: {0}")]
    InvalidRemoteAddress(String),
}

/// Result type for list operations.
pub type ListResult<T> = Result<T, ListError>;

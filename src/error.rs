//! Error types for the album sorter

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for album sorter operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the album sorter
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot read source directory {path}: {source}")]
    SourceUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Destination already exists: {path}")]
    DestinationExists { path: PathBuf },

    /// Not a failure: the source tree holds no qualifying files.
    #[error("No audio files found in {path}")]
    EmptyAlbum { path: PathBuf },

    #[error("Invalid path: {path}")]
    InvalidPath { path: PathBuf },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Directory traversal error: {0}")]
    WalkDir(#[from] walkdir::Error),
}

impl Error {
    /// Wrap an I/O failure that happened while listing `path`
    pub fn unreadable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::SourceUnreadable {
            path: path.into(),
            source,
        }
    }
}

//! Error types for the journal.

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Result type alias for journal operations.
pub type Result<T> = std::result::Result<T, JournalError>;

/// Errors that can occur while reading, creating or scanning entries.
#[derive(Error, Debug)]
pub enum JournalError {
    /// File name carries no guid and the file has no reference line.
    #[error("malformed entry: couldn't find guid on {0}")]
    MalformedEntry(String),

    /// Bad line window passed to `Entry::lines`.
    #[error("invalid line range: min={min} max={max:?}")]
    InvalidRange { min: usize, max: Option<usize> },

    /// Lookup came back empty.
    #[error("not found: {0}")]
    NotFound(String),

    /// Two entries claim the same quick link.
    #[error("@quick({value}) owned by {}, so {} can't take it", owner.display(), claimant.display())]
    Conflict {
        value: String,
        owner: PathBuf,
        claimant: PathBuf,
    },

    /// Quick tag value would place a link outside the quick directory.
    #[error("invalid quick path: {0}")]
    InvalidQuickPath(String),

    /// External editor or version-control command exited unsuccessfully.
    #[error("command `{command}` failed: {status}")]
    ExternalCommand { command: String, status: ExitStatus },

    /// Search pattern could not be compiled.
    #[error("invalid pattern: {0}")]
    InvalidPattern(String),

    /// Configuration file could not be parsed.
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for JournalError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<regex::Error> for JournalError {
    fn from(err: regex::Error) -> Self {
        Self::InvalidPattern(err.to_string())
    }
}

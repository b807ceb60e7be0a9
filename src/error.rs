//! Crate error type and result alias.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A malformed row or field in an input file. Always fatal.
    #[error("malformed record in `{file}` at line {line}: {reason}")]
    Parse {
        file: PathBuf,
        line: usize,
        reason: String,
    },

    /// The crop calendar has no entry for the requested region code.
    #[error("region code {0} not found in crop calendar")]
    RegionNotFound(i64),

    /// A distribution fit received a sample it cannot handle.
    #[error("distribution fit failed: {0}")]
    Fit(String),

    /// Missing or contradictory configuration, caught before any computation.
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn parse(file: impl Into<PathBuf>, line: usize, reason: impl Into<String>) -> Self {
        Error::Parse {
            file: file.into(),
            line,
            reason: reason.into(),
        }
    }

    pub fn config(reason: impl Into<String>) -> Self {
        Error::Config(reason.into())
    }
}

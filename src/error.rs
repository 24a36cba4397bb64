//! Error types raised by the sweep engine.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while validating options or rewriting log files.
///
/// Validation variants (`InvalidDays`, `UnknownLevel`, `InvalidPattern`) and
/// precondition variants (`Unreadable`, `Unwritable`) are always surfaced
/// before any file is touched. `Io` covers failures mid-rewrite; the
/// streaming rewriter guarantees the original file is unmodified in that
/// case because the destructive replacement is a single rename at the end.
#[derive(Debug, Error)]
pub enum SweepError {
    /// The retention window cannot be negative.
    #[error("days must be a non-negative integer, got {days}")]
    InvalidDays { days: i64 },

    /// A severity token outside the fixed vocabulary.
    #[error(
        "unknown log level '{token}', expected one of EMERGENCY, ALERT, \
         CRITICAL, ERROR, WARNING, NOTICE, INFO, DEBUG"
    )]
    UnknownLevel { token: String },

    /// A custom date pattern that does not compile.
    #[error("invalid date pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Pre-flight check failed: the file cannot be opened for reading.
    #[error("cannot read {}: {}", path.display(), source)]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Pre-flight check failed: the file cannot be opened for writing.
    #[error("cannot write {}: {}", path.display(), source)]
    Unwritable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// An open, read, write, rename, or compress failure mid-operation.
    #[error("failed to {} for {}: {}", context, path.display(), source)]
    Io {
        path: PathBuf,
        context: &'static str,
        #[source]
        source: io::Error,
    },
}

impl SweepError {
    pub(crate) fn io(path: &Path, context: &'static str, source: io::Error) -> Self {
        SweepError::Io {
            path: path.to_path_buf(),
            context,
            source,
        }
    }
}

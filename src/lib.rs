//! logsweep - log retention and rewrite engine.
//!
//! Prunes application log files line by line against a retention policy:
//! lines dated before a cutoff (and, optionally, lines of the wrong
//! severity) are removed, the survivors rewritten in place. Large files are
//! streamed through a sibling temp file and committed with an atomic rename,
//! so a target is always either fully rewritten or untouched.
//!
//! ## Architecture
//!
//! - [`policy`] - validated, immutable [`RetentionPolicy`] per invocation
//! - [`patterns`] - ordered date-pattern list and per-line date extraction
//! - [`filter`] - severity detection and the keep/drop decision engine
//! - [`rewrite`] - in-memory and streaming rewriters behind one dispatcher,
//!   plus pre-mutation backups
//! - [`archive`] - gzip sidecar holding exactly the removed lines
//! - [`scanner`] - `*.log` discovery and the read/write pre-flight pass

pub mod archive;
pub mod error;
pub mod filter;
pub mod patterns;
pub mod policy;
pub mod rewrite;
pub mod scanner;

// Re-export commonly used items
pub use archive::LineArchiver;
pub use error::SweepError;
pub use filter::LineFilter;
pub use patterns::{default_patterns, extract_date, DatePattern, DEFAULT_DATE_FORMAT};
pub use policy::{Level, RetentionOptions, RetentionPolicy};
pub use rewrite::{FileOutcome, LogRewriter, DEFAULT_STREAMING_THRESHOLD};
pub use scanner::{find_log_files, validate_access, LOG_EXTENSION};

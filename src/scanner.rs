//! Log file discovery and pre-flight access checks.

use crate::error::SweepError;
use ignore::WalkBuilder;
use std::fs::{File, OpenOptions};
use std::path::PathBuf;

/// Only files with this extension are candidates.
pub const LOG_EXTENSION: &str = "log";

/// Find `*.log` files under the given start paths.
///
/// Non-recursive by default (depth 1, mirroring a flat `logs/` directory);
/// `recursive` walks the whole tree. Inaccessible entries are warned about
/// and skipped rather than aborting discovery. The result is sorted and
/// deduplicated so processing order is deterministic.
pub fn find_log_files(paths: &[PathBuf], recursive: bool) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for start in paths {
        let mut builder = WalkBuilder::new(start);
        // Log directories are routinely gitignored; honoring ignore files
        // here would hide exactly the files we are after.
        builder.hidden(false).git_ignore(false).git_global(false);
        if !recursive {
            builder.max_depth(Some(1));
        }

        for result in builder.build() {
            let entry = match result {
                Ok(entry) => entry,
                Err(err) => {
                    eprintln!("Warning: failed to access entry: {}", err);
                    continue;
                }
            };
            let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
            if is_file
                && entry
                    .path()
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext == LOG_EXTENSION)
            {
                files.push(entry.path().to_path_buf());
            }
        }
    }

    files.sort();
    files.dedup();
    files
}

/// Verify every candidate file is readable and writable before any of them
/// is mutated.
///
/// Runs as a single pre-pass over the whole set (skipped by the caller in
/// dry-run mode), so a late permission failure cannot leave earlier files
/// processed while later ones are rejected. Opening in append mode proves
/// writability without modifying a byte.
pub fn validate_access(files: &[PathBuf]) -> Result<(), SweepError> {
    for path in files {
        File::open(path).map_err(|source| SweepError::Unreadable {
            path: path.clone(),
            source,
        })?;
        OpenOptions::new()
            .append(true)
            .open(path)
            .map_err(|source| SweepError::Unwritable {
                path: path.clone(),
                source,
            })?;
    }
    Ok(())
}

//! File rewrite strategies: in-memory for small files, streaming through a
//! temp file for large ones, selected by a size threshold or forced by flag.
//!
//! Both strategies share one contract: for the same file and policy they
//! produce byte-identical retained content and identical archive content;
//! only the memory profile differs. The original file is either fully
//! replaced or left untouched, never partially written.

use crate::archive::LineArchiver;
use crate::error::SweepError;
use crate::filter::LineFilter;
use crate::policy::RetentionPolicy;
use chrono::Local;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Files larger than this are rewritten line-by-line through a temp file.
pub const DEFAULT_STREAMING_THRESHOLD: u64 = 50 * 1024 * 1024;

/// Per-file processing result.
#[derive(Debug)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub lines_examined: u64,
    pub lines_removed: u64,
    pub bytes_before: u64,
    pub bytes_after: u64,
    pub backup_path: Option<PathBuf>,
    pub archive_path: Option<PathBuf>,
    /// Which strategy handled the file.
    pub streamed: bool,
}

/// Counters shared by both strategies.
struct RewriteStats {
    examined: u64,
    removed: u64,
    bytes_after: u64,
    archive_path: Option<PathBuf>,
}

/// Applies one [`RetentionPolicy`] to log files, dispatching each file to
/// the in-memory or streaming strategy.
pub struct LogRewriter {
    policy: RetentionPolicy,
    streaming_threshold: u64,
}

impl LogRewriter {
    pub fn new(policy: RetentionPolicy) -> Self {
        LogRewriter {
            policy,
            streaming_threshold: DEFAULT_STREAMING_THRESHOLD,
        }
    }

    /// Override the size threshold that triggers streaming mode. The default
    /// is [`DEFAULT_STREAMING_THRESHOLD`]; tests lower it to exercise the
    /// streaming path on small fixtures.
    pub fn with_streaming_threshold(mut self, bytes: u64) -> Self {
        self.streaming_threshold = bytes;
        self
    }

    /// Process one log file according to the policy.
    ///
    /// Order of effects: backup (if requested), then filter, with removed
    /// lines archived (if requested) before the retained content replaces
    /// the original. In dry-run mode nothing is written anywhere.
    pub fn process_file(&self, path: &Path) -> Result<FileOutcome, SweepError> {
        let bytes_before = fs::metadata(path)
            .map_err(|e| SweepError::io(path, "read metadata", e))?
            .len();
        let timestamp = Local::now().format("%Y%m%d%H%M%S").to_string();

        let backup_path = if self.policy.backup && !self.policy.dry_run {
            Some(create_backup(path, &timestamp)?)
        } else {
            None
        };

        let filter = LineFilter::new(&self.policy);
        let streamed = self.policy.memory_efficient || bytes_before > self.streaming_threshold;
        let stats = if streamed {
            self.rewrite_streaming(&filter, path, &timestamp)?
        } else {
            self.rewrite_in_memory(&filter, path, &timestamp)?
        };

        Ok(FileOutcome {
            path: path.to_path_buf(),
            lines_examined: stats.examined,
            lines_removed: stats.removed,
            bytes_before,
            bytes_after: stats.bytes_after,
            backup_path,
            archive_path: stats.archive_path,
            streamed,
        })
    }

    /// Load the whole file, filter, and replace its content in one write.
    fn rewrite_in_memory(
        &self,
        filter: &LineFilter<'_>,
        path: &Path,
        timestamp: &str,
    ) -> Result<RewriteStats, SweepError> {
        let content =
            fs::read_to_string(path).map_err(|e| SweepError::io(path, "read contents", e))?;

        let mut kept: Vec<&str> = Vec::new();
        let mut removed: Vec<&str> = Vec::new();
        for line in content.split('\n') {
            if filter.keep(line) {
                kept.push(line);
            } else {
                removed.push(line);
            }
        }
        let new_content = kept.join("\n");
        let stats = RewriteStats {
            examined: (kept.len() + removed.len()) as u64,
            removed: removed.len() as u64,
            bytes_after: new_content.len() as u64,
            archive_path: None,
        };

        if self.policy.dry_run {
            return Ok(stats);
        }

        // Removed lines go to the archive before the retained content
        // overwrites the original.
        let archive_path = if self.policy.compress {
            let mut archiver = LineArchiver::new(archive_path_for(path, timestamp));
            for line in &removed {
                archiver.push(line)?;
            }
            archiver.finish()?
        } else {
            None
        };

        fs::write(path, &new_content)
            .map_err(|e| SweepError::io(path, "write filtered contents", e))?;

        Ok(RewriteStats {
            archive_path,
            ..stats
        })
    }

    /// Filter one line at a time into a sibling temp file, then atomically
    /// rename it over the original. Rejected lines stream straight into the
    /// archiver without being buffered.
    fn rewrite_streaming(
        &self,
        filter: &LineFilter<'_>,
        path: &Path,
        timestamp: &str,
    ) -> Result<RewriteStats, SweepError> {
        let source = File::open(path).map_err(|e| SweepError::io(path, "open", e))?;
        let mut reader = BufReader::new(source);

        let tmp_path = suffixed_path(path, ".tmp");
        let mut writer = if self.policy.dry_run {
            None
        } else {
            let file = File::create(&tmp_path)
                .map_err(|e| SweepError::io(&tmp_path, "create temp file", e))?;
            Some(BufWriter::new(file))
        };
        let mut archiver = if self.policy.compress && !self.policy.dry_run {
            Some(LineArchiver::new(archive_path_for(path, timestamp)))
        } else {
            None
        };

        let mut examined = 0u64;
        let mut removed = 0u64;
        let mut bytes_after = 0u64;
        let mut first_kept = true;
        // A trailing terminator implies one final empty logical line, and an
        // empty source carries a single empty line, matching the split
        // semantics of the in-memory path.
        let mut pending_empty = true;
        let mut buf = String::new();

        loop {
            buf.clear();
            let n = reader
                .read_line(&mut buf)
                .map_err(|e| SweepError::io(path, "read line", e))?;
            let line = if n == 0 {
                if !pending_empty {
                    break;
                }
                pending_empty = false;
                ""
            } else {
                pending_empty = buf.ends_with('\n');
                buf.strip_suffix('\n').unwrap_or(&buf)
            };

            examined += 1;
            if filter.keep(line) {
                if let Some(w) = writer.as_mut() {
                    if !first_kept {
                        w.write_all(b"\n")
                            .map_err(|e| SweepError::io(&tmp_path, "write temp file", e))?;
                    }
                    w.write_all(line.as_bytes())
                        .map_err(|e| SweepError::io(&tmp_path, "write temp file", e))?;
                }
                bytes_after += line.len() as u64 + u64::from(!first_kept);
                first_kept = false;
            } else {
                removed += 1;
                if let Some(a) = archiver.as_mut() {
                    a.push(line)?;
                }
            }

            if n == 0 {
                break;
            }
        }

        let archive_path = match archiver {
            Some(a) => a.finish()?,
            None => None,
        };

        if let Some(w) = writer {
            w.into_inner()
                .map_err(|e| SweepError::io(&tmp_path, "flush temp file", e.into_error()))?;
            // The swap is the last step; on failure the original is intact
            // and the temp file is discarded.
            if let Err(e) = fs::rename(&tmp_path, path) {
                let _ = fs::remove_file(&tmp_path);
                return Err(SweepError::io(path, "replace with rewritten copy", e));
            }
        }

        Ok(RewriteStats {
            examined,
            removed,
            bytes_after,
            archive_path,
        })
    }
}

/// Copy the original verbatim to `<name>.log.backup.<timestamp>` before any
/// rewrite begins. A copy failure aborts the file's operation; the original
/// has not been touched at that point.
fn create_backup(path: &Path, timestamp: &str) -> Result<PathBuf, SweepError> {
    let backup_path = suffixed_path(path, &format!(".backup.{timestamp}"));
    fs::copy(path, &backup_path).map_err(|e| SweepError::io(path, "create backup", e))?;
    Ok(backup_path)
}

fn archive_path_for(path: &Path, timestamp: &str) -> PathBuf {
    suffixed_path(path, &format!(".old.{timestamp}.gz"))
}

/// `<dir>/<name>.log` plus a suffix, e.g. `<dir>/<name>.log.tmp`.
fn suffixed_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("log"));
    name.push(suffix);
    path.with_file_name(name)
}

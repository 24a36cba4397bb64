//! Gzip archiving of removed log lines.

use crate::error::SweepError;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

/// Streaming writer for the lines removed from one file.
///
/// The archive is created lazily on the first pushed line, so an invocation
/// that removes nothing leaves no empty `.gz` behind. Both rewrite
/// strategies feed this type: the in-memory rewriter pushes its removed
/// batch, the streaming rewriter pushes rejected lines as it reads them.
pub struct LineArchiver {
    archive_path: PathBuf,
    encoder: Option<GzEncoder<BufWriter<File>>>,
}

impl LineArchiver {
    pub fn new(archive_path: PathBuf) -> Self {
        LineArchiver {
            archive_path,
            encoder: None,
        }
    }

    /// Append one removed line. The terminator is added here so the archive
    /// is newline-terminated regardless of where the line sat in the source.
    pub fn push(&mut self, line: &str) -> Result<(), SweepError> {
        if self.encoder.is_none() {
            let file = File::create(&self.archive_path)
                .map_err(|e| SweepError::io(&self.archive_path, "create archive", e))?;
            self.encoder = Some(GzEncoder::new(BufWriter::new(file), Compression::best()));
        }
        if let Some(encoder) = self.encoder.as_mut() {
            encoder
                .write_all(line.as_bytes())
                .and_then(|()| encoder.write_all(b"\n"))
                .map_err(|e| SweepError::io(&self.archive_path, "write archive", e))?;
        }
        Ok(())
    }

    /// Finalize the gzip stream. Returns the archive path if any line was
    /// written, `None` otherwise (in which case no file was created).
    pub fn finish(self) -> Result<Option<PathBuf>, SweepError> {
        match self.encoder {
            Some(encoder) => {
                let writer = encoder
                    .finish()
                    .map_err(|e| SweepError::io(&self.archive_path, "finalize archive", e))?;
                writer
                    .into_inner()
                    .map_err(|e| {
                        SweepError::io(&self.archive_path, "flush archive", e.into_error())
                    })?;
                Ok(Some(self.archive_path))
            }
            None => Ok(None),
        }
    }
}

// src/output/writer.rs
//! File I/O for export outputs.
//!
//! This module is the only place where output files are created. The JSON
//! document is always replaced atomically so an interrupted run leaves the
//! previous checkpoint readable.

use crate::error::AppError;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// UTF-8 byte order mark, so Windows viewers detect the encoding.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Atomically replaces one file: write a sibling temp file, sync, rename.
#[derive(Debug, Clone)]
pub struct AtomicFileWriter {
    target: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(target: impl Into<PathBuf>) -> Self {
        Self {
            target: target.into(),
        }
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Writes `content` and returns the number of bytes written.
    pub fn write(&self, content: &str) -> Result<usize, AppError> {
        let dir = parent_dir(&self.target);
        fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;
        tmp.persist(&self.target).map_err(|e| AppError::Io(e.error))?;

        log::debug!("Wrote {} bytes to {}", content.len(), self.target.display());
        Ok(content.len())
    }
}

/// Creates (truncating) a text output file, prefixed with a BOM.
pub fn create_text_file(path: &Path) -> Result<BufWriter<File>, AppError> {
    fs::create_dir_all(parent_dir(path))?;
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(UTF8_BOM)?;
    log::info!("Writing text output to {}", path.display());
    Ok(writer)
}

// `Path::parent` is `Some("")` for bare file names.
fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

// src/output/sink.rs
//! Destinations for accepted records.
//!
//! A run uses exactly one sink. The streaming sink writes each record as
//! soon as it is accepted and keeps nothing. The buffered sink keeps every
//! record keyed by identity and rewrites the whole JSON document at each
//! checkpoint.

use super::text::render_block;
use super::types::{Checkpoint, DocumentMeta, ExportDocument, RunMeta};
use super::writer::{create_text_file, AtomicFileWriter};
use crate::error::AppError;
use crate::model::ExportRecord;
use crate::types::ItemIdentity;
use indexmap::IndexMap;
use std::fs::File;
use std::io::{self, BufWriter, Stdout, Write};
use std::path::PathBuf;

/// Receives records from the traversal.
pub trait ResultSink: Send {
    /// Takes ownership of an accepted record.
    fn accept(&mut self, identity: &ItemIdentity, record: ExportRecord) -> Result<(), AppError>;

    /// Persists progress so far.
    fn checkpoint(&mut self, checkpoint: &Checkpoint) -> Result<(), AppError>;

    /// Flushes anything still buffered.
    fn finish(&mut self) -> Result<(), AppError>;

    /// Number of distinct records currently held, if the sink keeps any.
    fn unique_items(&self) -> Option<usize> {
        None
    }
}

/// Writes text blocks to any [`Write`] as records arrive.
pub struct StreamingSink<W: Write> {
    writer: W,
    written: usize,
}

impl<W: Write> StreamingSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl StreamingSink<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl StreamingSink<BufWriter<File>> {
    /// Streams into a new file that starts with a UTF-8 BOM.
    pub fn create(path: &std::path::Path) -> Result<Self, AppError> {
        Ok(Self::new(create_text_file(path)?))
    }
}

impl<W: Write + Send> ResultSink for StreamingSink<W> {
    fn accept(&mut self, _identity: &ItemIdentity, record: ExportRecord) -> Result<(), AppError> {
        self.writer.write_all(render_block(&record).as_bytes())?;
        self.writer.flush()?;
        self.written += 1;
        Ok(())
    }

    fn checkpoint(&mut self, _checkpoint: &Checkpoint) -> Result<(), AppError> {
        self.writer.flush()?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), AppError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Accumulates records and materializes them as one JSON document.
pub struct BufferedSink {
    meta: RunMeta,
    items: IndexMap<ItemIdentity, ExportRecord>,
    writer: AtomicFileWriter,
    materializations: usize,
}

impl BufferedSink {
    pub fn new(path: impl Into<PathBuf>, meta: RunMeta) -> Self {
        Self {
            meta,
            items: IndexMap::new(),
            writer: AtomicFileWriter::new(path),
            materializations: 0,
        }
    }

    pub fn items(&self) -> &IndexMap<ItemIdentity, ExportRecord> {
        &self.items
    }

    /// How many times the document has been rewritten.
    pub fn materializations(&self) -> usize {
        self.materializations
    }

    /// Serializes the full document for `checkpoint`, pretty, newline-terminated.
    pub fn render(&self, checkpoint: &Checkpoint) -> Result<String, AppError> {
        let document = ExportDocument {
            meta: DocumentMeta {
                mode: &self.meta.mode,
                target_types: &self.meta.target_types,
                expected: self.meta.expected,
                printed_total: checkpoint.printed_total,
                unique_items: self.items.len(),
                last: &checkpoint.position,
                stopped: checkpoint.stopped,
                updated_at: chrono::Utc::now(),
            },
            items_by_id: &self.items,
        };
        let mut json = serde_json::to_string_pretty(&document)?;
        json.push('\n');
        Ok(json)
    }
}

impl ResultSink for BufferedSink {
    fn accept(&mut self, identity: &ItemIdentity, record: ExportRecord) -> Result<(), AppError> {
        self.items.insert(identity.clone(), record);
        Ok(())
    }

    fn checkpoint(&mut self, checkpoint: &Checkpoint) -> Result<(), AppError> {
        let json = self.render(checkpoint)?;
        self.writer.write(&json)?;
        self.materializations += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), AppError> {
        Ok(())
    }

    fn unique_items(&self) -> Option<usize> {
        Some(self.items.len())
    }
}

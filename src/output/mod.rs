// src/output/mod.rs
//! Output handling: where accepted records go and how they are written.
//!
//! Rendering (pure) lives in `text` and `types`; the only file I/O happens
//! in `writer`.

mod sink;
mod text;
mod types;
mod writer;

pub use sink::{BufferedSink, ResultSink, StreamingSink};
pub use text::render_block;
pub use types::{Checkpoint, Position, RunMeta};
pub use writer::{create_text_file, AtomicFileWriter, UTF8_BOM};

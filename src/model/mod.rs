// src/model/mod.rs
//! Domain model: what a folder page contains and what the exporter emits.

mod fields;
mod item;
mod record;

pub use fields::{as_integer, field_text, first_text, is_present, text_of};
pub use item::{Folder, RawItem};
pub use record::{ExportRecord, SentenceRecord, WordFields, WordHeadline, WordRecord};

// src/output/types.rs
//! Shapes of the buffered JSON export document.

use crate::model::{ExportRecord, Folder};
use crate::types::ItemIdentity;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;

/// Run-wide facts echoed in every materialized document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunMeta {
    /// The `--mode` name, even when `--target-types` overrode it.
    pub mode: String,
    /// Sorted allowlist, as forwarded to the server.
    pub target_types: Vec<i64>,
    /// Expected unique total; `0` when unset.
    pub expected: u64,
}

/// The last (folder, sortType, page) the traversal touched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub folder_id: String,
    pub folder_title: String,
    pub sort_type: i64,
    pub page_index: u32,
}

impl Position {
    pub fn new(folder: &Folder, sort_type: i64, page_index: u32) -> Self {
        Self {
            folder_id: folder.id.to_string(),
            folder_title: folder.title.clone(),
            sort_type,
            page_index,
        }
    }
}

/// Traversal state handed to a sink at each checkpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkpoint {
    pub position: Position,
    pub printed_total: usize,
    pub stopped: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct DocumentMeta<'a> {
    pub mode: &'a str,
    pub target_types: &'a [i64],
    pub expected: u64,
    pub printed_total: usize,
    pub unique_items: usize,
    pub last: &'a Position,
    pub stopped: bool,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ExportDocument<'a> {
    pub meta: DocumentMeta<'a>,
    pub items_by_id: &'a IndexMap<ItemIdentity, ExportRecord>,
}

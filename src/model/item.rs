// src/model/item.rs
//! Raw rows of a folder page and the folders themselves.

use super::fields::{as_integer, first_text, text_of};
use crate::types::{FolderId, ItemIdentity, TargetType};
use serde::Serialize;
use serde_json::{Map, Value};

/// One row of a `folder-fetchContentWithRelatives` page.
///
/// Ephemeral: consumed by the classifier and discarded.
#[derive(Debug, Clone, PartialEq)]
pub struct RawItem {
    pub target_type: Option<TargetType>,
    /// Present only when the row's `target` is an object.
    pub target: Option<Map<String, Value>>,
}

impl RawItem {
    pub fn from_value(row: &Value) -> Option<Self> {
        let row = row.as_object()?;
        let target_type = row
            .get("targetType")
            .filter(|v| v.is_i64() || v.is_u64())
            .and_then(as_integer)
            .map(TargetType::new);
        let target = row.get("target").and_then(Value::as_object).cloned();
        Some(Self {
            target_type,
            target,
        })
    }

    /// Dedup identity, or `None` for rows without an object target.
    pub fn identity(&self) -> Option<ItemIdentity> {
        let target = self.target.as_ref()?;
        let key = first_text(target, &["objectId", "id"]);
        if !key.is_empty() {
            return Some(ItemIdentity::new(self.target_type, key));
        }
        let word_id = target.get("wordId").map(text_of).unwrap_or_default();
        let title = target.get("title").map(text_of).unwrap_or_default();
        Some(ItemIdentity::synthetic(self.target_type, &word_id, &title))
    }
}

/// A user folder as returned by `fetchMyFolders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Folder {
    pub id: FolderId,
    pub title: String,
}

impl Folder {
    pub fn new(id: FolderId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
        }
    }

    /// Reads a folder row. The web bundle maps `targetId` as the folder id;
    /// some responses use `objectId` or `id` instead. Rows without any id
    /// cannot be traversed and are dropped.
    pub fn from_value(row: &Value) -> Option<Self> {
        let row = row.as_object()?;
        let id = FolderId::from_text(&first_text(row, &["targetId", "objectId", "id"]))?;
        let title = first_text(row, &["title", "name"]);
        Some(Self { id, title })
    }
}

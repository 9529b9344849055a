// src/model/record.rs
//! Normalized export records.
//!
//! Field names follow the JSON document the exporter writes (`camelCase`),
//! so the records serialize directly into `itemsById`.

use super::item::Folder;
use crate::types::TargetType;
use serde::Serialize;

/// Display fields of a dictionary word, as resolved from `detailInfo`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordFields {
    pub spell: String,
    pub pron: String,
    pub accent: String,
    pub excerpt: String,
}

impl WordFields {
    /// Fills every empty field from `other`, never overwriting present values.
    pub fn fill_gaps_from(&mut self, other: &WordFields) {
        fill(&mut self.spell, &other.spell);
        fill(&mut self.pron, &other.pron);
        fill(&mut self.accent, &other.accent);
        fill(&mut self.excerpt, &other.excerpt);
    }

    pub fn is_incomplete(&self) -> bool {
        self.spell.is_empty() || self.pron.is_empty()
    }
}

fn fill(slot: &mut String, resolved: &str) {
    if slot.is_empty() {
        *slot = resolved.to_string();
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordHeadline {
    pub spell: String,
    pub pron: String,
}

/// An example or voice sentence (tags 103/120).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SentenceRecord {
    pub target_type: TargetType,
    pub item_id: String,
    pub word_id: String,
    pub word: WordHeadline,
    pub jp: String,
    pub trans: String,
    pub folder: Folder,
    pub sort_type: i64,
}

/// A saved dictionary word (tag 102).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WordRecord {
    pub target_type: TargetType,
    pub item_id: String,
    pub word_id: String,
    pub spell: String,
    pub pron: String,
    pub accent: String,
    pub excerpt: String,
    pub folder: Folder,
    pub sort_type: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ExportRecord {
    Sentence(SentenceRecord),
    Word(WordRecord),
}

impl ExportRecord {
    pub fn target_type(&self) -> TargetType {
        match self {
            Self::Sentence(s) => s.target_type,
            Self::Word(w) => w.target_type,
        }
    }

    pub fn item_id(&self) -> &str {
        match self {
            Self::Sentence(s) => &s.item_id,
            Self::Word(w) => &w.item_id,
        }
    }

    pub fn folder(&self) -> &Folder {
        match self {
            Self::Sentence(s) => &s.folder,
            Self::Word(w) => &w.folder,
        }
    }
}

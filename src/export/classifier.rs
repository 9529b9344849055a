// src/export/classifier.rs
//! Turns raw page rows into export records.

use crate::api::{MojiGateway, WordResolver};
use crate::model::{
    field_text, first_text, text_of, ExportRecord, Folder, RawItem, SentenceRecord, WordFields,
    WordHeadline, WordRecord,
};
use crate::types::{ItemKind, TargetType, TargetTypeSet, WordId};
use serde_json::{Map, Value};

/// Where an item was found; copied into every record built from it.
#[derive(Debug, Clone, Copy)]
pub struct Origin<'a> {
    pub folder: &'a Folder,
    pub sort_type: i64,
}

/// Classifies items against an allowlist and builds records.
#[derive(Debug, Clone)]
pub struct ItemClassifier {
    allowed: TargetTypeSet,
}

impl ItemClassifier {
    pub fn new(allowed: TargetTypeSet) -> Self {
        Self { allowed }
    }

    pub fn allowed(&self) -> &TargetTypeSet {
        &self.allowed
    }

    pub fn allows(&self, item: &RawItem) -> bool {
        self.allowed.allows(item.target_type)
    }

    /// Builds a record for `item`, or `None` when it is filtered out or
    /// lacks the fields its kind requires. May consult `words`, which in
    /// turn may call `gateway` once per unseen word id.
    pub async fn classify(
        &self,
        item: &RawItem,
        origin: Origin<'_>,
        words: &mut WordResolver,
        gateway: &dyn MojiGateway,
    ) -> Option<ExportRecord> {
        let tag = item.target_type.filter(|t| self.allowed.allows(Some(*t)))?;
        let target = item.target.as_ref()?;
        let identity = item.identity()?;

        match tag.kind() {
            ItemKind::SentenceLike => {
                sentence(tag, identity.key(), target, origin, words, gateway).await
            }
            ItemKind::Word => word(tag, identity.key(), target, origin, words, gateway).await,
            ItemKind::Other => None,
        }
    }
}

async fn sentence(
    tag: TargetType,
    item_id: &str,
    target: &Map<String, Value>,
    origin: Origin<'_>,
    words: &mut WordResolver,
    gateway: &dyn MojiGateway,
) -> Option<ExportRecord> {
    let jp = first_text(target, &["title", "notationTitle"]);
    if jp.is_empty() {
        return None;
    }
    let trans = first_text(target, &["trans", "excerpt"]);
    // A numeric `0` is still a word id; only null or missing means none.
    let word_id = target
        .get("wordId")
        .filter(|value| !value.is_null())
        .map(|value| text_of(value).trim().to_string())
        .unwrap_or_default();

    let resolved = match WordId::from_text(&word_id) {
        Some(id) => words.resolve(gateway, &id).await,
        None => WordFields::default(),
    };

    Some(ExportRecord::Sentence(SentenceRecord {
        target_type: tag,
        item_id: item_id.to_string(),
        word_id,
        word: WordHeadline {
            spell: resolved.spell,
            pron: resolved.pron,
        },
        jp,
        trans,
        folder: origin.folder.clone(),
        sort_type: origin.sort_type,
    }))
}

async fn word(
    tag: TargetType,
    item_id: &str,
    target: &Map<String, Value>,
    origin: Origin<'_>,
    words: &mut WordResolver,
    gateway: &dyn MojiGateway,
) -> Option<ExportRecord> {
    let word_id = first_text(target, &["objectId", "id"]);
    let mut fields = WordFields {
        spell: first_text(target, &["spell", "title"]),
        pron: field_text(target, "pron"),
        accent: field_text(target, "accent"),
        excerpt: field_text(target, "excerpt"),
    };

    if fields.is_incomplete() {
        if let Some(id) = WordId::from_text(&word_id) {
            let resolved = words.resolve(gateway, &id).await;
            fields.fill_gaps_from(&resolved);
        }
    }

    if fields.spell.is_empty() && fields.excerpt.is_empty() {
        return None;
    }

    Some(ExportRecord::Word(WordRecord {
        target_type: tag,
        item_id: item_id.to_string(),
        word_id,
        spell: fields.spell,
        pron: fields.pron,
        accent: fields.accent,
        excerpt: fields.excerpt,
        folder: origin.folder.clone(),
        sort_type: origin.sort_type,
    }))
}

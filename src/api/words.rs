// src/api/words.rs
//! Memoized word-detail lookups.
//!
//! Sentence items only carry a `wordId`; their headword comes from
//! `api/v1/word/detailInfo`. The same word is typically referenced by many
//! sentences, so every lookup is cached for the whole run, failures
//! included. A failed lookup is a soft miss: the caller receives empty
//! fields and traversal carries on.

use super::MojiGateway;
use crate::model::{field_text, WordFields};
use crate::types::WordId;
use serde_json::Value;
use std::collections::HashMap;

/// Outcome of one `detailInfo` call, kept for the rest of the run.
#[derive(Debug, Clone, PartialEq)]
pub enum WordLookup {
    Resolved(WordFields),
    /// Terminal: the id is never retried.
    Failed(String),
}

impl WordLookup {
    fn fields(&self) -> WordFields {
        match self {
            Self::Resolved(fields) => fields.clone(),
            Self::Failed(_) => WordFields::default(),
        }
    }
}

/// Run-scoped cache from word id to display fields.
#[derive(Debug, Default)]
pub struct WordResolver {
    entries: HashMap<WordId, WordLookup>,
    lookups: usize,
}

impl WordResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves a word, calling the gateway only on the first request for
    /// `id`. Never fails; unknown or failed words yield empty fields.
    pub async fn resolve(&mut self, gateway: &dyn MojiGateway, id: &WordId) -> WordFields {
        if let Some(entry) = self.entries.get(id) {
            return entry.fields();
        }

        self.lookups += 1;
        let entry = match gateway
            .get_resource(&["api", "v1", "word", "detailInfo"], &[("wordId", id.as_str())])
            .await
        {
            Ok(body) => WordLookup::Resolved(word_fields(&body)),
            Err(e) => {
                log::debug!("Word detail lookup failed for {}: {}", id, e);
                WordLookup::Failed(e.to_string())
            }
        };
        let fields = entry.fields();
        self.entries.insert(id.clone(), entry);
        fields
    }

    /// Cached outcome for `id`, if it has been looked up.
    pub fn get(&self, id: &WordId) -> Option<&WordLookup> {
        self.entries.get(id)
    }

    /// Number of gateway calls made so far.
    pub fn lookups(&self) -> usize {
        self.lookups
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Reads the nested `word` object; anything else gives empty fields.
fn word_fields(body: &Value) -> WordFields {
    match body.get("word").and_then(Value::as_object) {
        Some(word) => WordFields {
            spell: field_text(word, "spell"),
            pron: field_text(word, "pron"),
            accent: field_text(word, "accent"),
            excerpt: field_text(word, "excerpt"),
        },
        None => WordFields::default(),
    }
}

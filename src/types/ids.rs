// src/types/ids.rs
use super::{TargetType, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;

/// Strong typing for remote object ids with phantom types.
///
/// MOJi ids are opaque strings (Parse object ids, or composite ids such as
/// `ROOT#com.mojitec.mojidict#zh-CN_ja` for root folders). The only rule we
/// enforce is that they are non-empty once trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id<T> {
    value: String,
    _phantom: PhantomData<T>,
}

/// Marker types for different ID kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FolderMarker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WordMarker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemMarker;

pub type FolderId = Id<FolderMarker>;
pub type WordId = Id<WordMarker>;
pub type ItemId = Id<ItemMarker>;

impl<T> Id<T> {
    /// Parses a user- or server-supplied id, rejecting blank input.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyField("id"));
        }
        Ok(Self::from_trimmed(trimmed.to_string()))
    }

    /// Like [`Id::parse`] but for optional JSON-derived text.
    pub fn from_text(input: &str) -> Option<Self> {
        Self::parse(input).ok()
    }

    fn from_trimmed(value: String) -> Self {
        Self {
            value,
            _phantom: PhantomData,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<T> Serialize for Id<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.value.serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for Id<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value).map_err(serde::de::Error::custom)
    }
}

/// Dedup key for a saved item: `"{targetType}:{key}"`.
///
/// `key` is the target's object id when present, otherwise a synthetic
/// `"{wordId}::{title}"`. The same logical item must map to the same identity
/// no matter which folder, sort order, or page surfaced it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemIdentity {
    tag: Option<TargetType>,
    key: String,
}

impl ItemIdentity {
    pub fn new(tag: Option<TargetType>, key: impl Into<String>) -> Self {
        Self {
            tag,
            key: key.into(),
        }
    }

    /// Identity built from the synthetic fallback when the item has no id.
    pub fn synthetic(tag: Option<TargetType>, word_id: &str, title: &str) -> Self {
        Self::new(tag, format!("{}::{}", word_id, title))
    }

    pub fn target_type(&self) -> Option<TargetType> {
        self.tag
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for ItemIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tag {
            Some(tag) => write!(f, "{}:{}", tag, self.key),
            None => write!(f, "None:{}", self.key),
        }
    }
}

// Identities are JSON object keys in the buffered document.
impl Serialize for ItemIdentity {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

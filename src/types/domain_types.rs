// src/types/domain_types.rs
//! Domain-specific newtypes for type safety and validation.

use super::ValidationError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Parse session token of the logged-in user.
///
/// Treated like a password: never persisted, redacted on display.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Result<Self, ValidationError> {
        let token = token.into().trim().to_string();

        if token.is_empty() {
            return Err(ValidationError::InvalidSessionToken {
                reason: "session token cannot be empty".to_string(),
            });
        }

        if token.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(ValidationError::InvalidSessionToken {
                reason: "session token cannot contain whitespace".to_string(),
            });
        }

        Ok(Self(token))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let visible: String = self.0.chars().take(6).collect();
        write!(f, "{}...", visible)
    }
}

// Debug must not leak the token either.
impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionToken({})", self)
    }
}

/// Server-defined integer tag classifying a saved item.
///
/// From the web bundle: 102 word, 103/120 example or voice sentence,
/// 10 bookmark, 200 news, 210 article, 1000 folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetType(i64);

impl TargetType {
    pub const WORD: Self = Self(102);
    pub const EXAMPLE: Self = Self(103);
    pub const VOICE_SENTENCE: Self = Self(120);

    pub const fn new(tag: i64) -> Self {
        Self(tag)
    }

    pub const fn tag(self) -> i64 {
        self.0
    }

    pub fn kind(self) -> ItemKind {
        match self {
            Self::WORD => ItemKind::Word,
            Self::EXAMPLE | Self::VOICE_SENTENCE => ItemKind::SentenceLike,
            _ => ItemKind::Other,
        }
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Semantic kind of a saved item, the closed set the classifier dispatches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Word,
    SentenceLike,
    Other,
}

/// The allowlist of target types a run exports.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TargetTypeSet(BTreeSet<TargetType>);

impl TargetTypeSet {
    pub fn sentences() -> Self {
        Self::from_tags([TargetType::EXAMPLE, TargetType::VOICE_SENTENCE])
    }

    pub fn words() -> Self {
        Self::from_tags([TargetType::WORD])
    }

    pub fn both() -> Self {
        Self::from_tags([
            TargetType::WORD,
            TargetType::EXAMPLE,
            TargetType::VOICE_SENTENCE,
        ])
    }

    pub fn from_tags(tags: impl IntoIterator<Item = TargetType>) -> Self {
        Self(tags.into_iter().collect())
    }

    /// Parses a comma-separated allowlist such as `"102,103,120"`.
    ///
    /// Returns `Ok(None)` when the list has no entries, so the caller can
    /// fall back to the named mode.
    pub fn parse_list(input: &str) -> Result<Option<Self>, ValidationError> {
        let mut tags = BTreeSet::new();
        for part in input.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let tag = part
                .parse::<i64>()
                .map_err(|_| ValidationError::InvalidTargetType(part.to_string()))?;
            tags.insert(TargetType::new(tag));
        }
        if tags.is_empty() {
            Ok(None)
        } else {
            Ok(Some(Self(tags)))
        }
    }

    /// Whether an item with this (possibly missing) tag passes the filter.
    pub fn allows(&self, tag: Option<TargetType>) -> bool {
        tag.is_some_and(|t| self.0.contains(&t))
    }

    /// Sorted tags as forwarded to the server in `targetTypes`.
    pub fn server_hint(&self) -> Vec<i64> {
        self.0.iter().map(|t| t.tag()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = TargetType> + '_ {
        self.0.iter().copied()
    }
}

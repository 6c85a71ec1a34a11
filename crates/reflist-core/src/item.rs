//! List rows and their persisted shape

use crate::id::{ItemKey, ReferenceId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Free-text commentary attached to a row
///
/// Either a single text for the field's locale, or a mapping from locale code
/// to text when one value carries several locales. Serialized untagged, so a
/// plain JSON string and a JSON object are both accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Comment {
    /// Single-locale text
    Text(String),
    /// Locale code to text
    Localized(BTreeMap<String, String>),
}

impl Comment {
    /// Whether no commentary is present in any locale
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.is_empty(),
            Self::Localized(map) => map.values().all(String::is_empty),
        }
    }

    /// Text for one locale; plain text answers for every locale
    #[must_use]
    pub fn text_for(&self, locale: &str) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Localized(map) => map.get(locale).map(String::as_str),
        }
    }

    /// Replace the whole comment, or only the text of one locale
    ///
    /// A per-locale write onto plain text turns the comment into a mapping;
    /// non-empty plain text is kept in it under `home_locale`, the locale the
    /// plain text was written in.
    pub fn set(&mut self, locale: Option<&str>, home_locale: &str, text: impl Into<String>) {
        let text = text.into();
        let Some(locale) = locale else {
            *self = Self::Text(text);
            return;
        };
        match self {
            Self::Localized(map) => {
                map.insert(locale.to_string(), text);
            }
            Self::Text(existing) => {
                let mut map = BTreeMap::new();
                if !existing.is_empty() {
                    map.insert(home_locale.to_string(), std::mem::take(existing));
                }
                map.insert(locale.to_string(), text);
                *self = Self::Localized(map);
            }
        }
    }
}

impl Default for Comment {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl From<&str> for Comment {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Comment {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

/// Persisted shape of one row, as stored on the host record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalEntry {
    /// Referenced id, `null` while the row is unfinished
    pub id: Option<ReferenceId>,
    /// Commentary
    #[serde(default)]
    pub comment: Comment,
}

impl CanonicalEntry {
    /// Create an entry
    #[inline]
    #[must_use]
    pub fn new(id: Option<ReferenceId>, comment: impl Into<Comment>) -> Self {
        Self {
            id,
            comment: comment.into(),
        }
    }
}

/// One editable row of the list
///
/// The key is assigned at construction and cannot be changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceItem {
    key: ItemKey,
    id: Option<ReferenceId>,
    comment: Comment,
}

impl ReferenceItem {
    /// Fresh row with no id and an empty comment
    #[must_use]
    pub fn blank() -> Self {
        Self::with_id(None)
    }

    /// Fresh row for an id with an empty comment
    #[must_use]
    pub fn with_id(id: Option<ReferenceId>) -> Self {
        Self {
            key: ItemKey::generate(),
            id,
            comment: Comment::default(),
        }
    }

    /// Fresh row carrying a persisted entry's id and comment
    #[must_use]
    pub fn from_entry(entry: CanonicalEntry) -> Self {
        Self {
            key: ItemKey::generate(),
            id: entry.id,
            comment: entry.comment,
        }
    }

    /// Addressing key
    #[inline]
    #[must_use]
    pub fn key(&self) -> ItemKey {
        self.key
    }

    /// Referenced id
    #[inline]
    #[must_use]
    pub fn id(&self) -> Option<ReferenceId> {
        self.id
    }

    /// Commentary
    #[inline]
    #[must_use]
    pub fn comment(&self) -> &Comment {
        &self.comment
    }

    /// Change the referenced id
    #[inline]
    pub fn set_id(&mut self, id: Option<ReferenceId>) {
        self.id = id;
    }

    /// Mutable commentary
    #[inline]
    pub fn comment_mut(&mut self) -> &mut Comment {
        &mut self.comment
    }

    /// Persisted shape of this row
    #[must_use]
    pub fn to_entry(&self) -> CanonicalEntry {
        CanonicalEntry {
            id: self.id,
            comment: self.comment.clone(),
        }
    }
}

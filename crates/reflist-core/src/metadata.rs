//! Derived descriptive metadata for a referenced id

use serde::{Deserialize, Serialize};

/// Title shown when no metadata could be found for an id
pub const PLACEHOLDER_TITLE: &str = "Can't find the item";

/// Title and preview image of a referenced item
///
/// Derived from an external lookup, keyed by id, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    /// Display title
    pub title: String,
    /// Preview image URL, empty when unknown
    pub image_url: String,
}

impl Metadata {
    /// Create metadata
    #[inline]
    #[must_use]
    pub fn new(title: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            image_url: image_url.into(),
        }
    }

    /// Fallback value substituted when a lookup fails
    #[must_use]
    pub fn placeholder() -> Self {
        Self::new(PLACEHOLDER_TITLE, "")
    }

    /// Whether this is the fallback value
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.title == PLACEHOLDER_TITLE && self.image_url.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_shape() {
        let meta = Metadata::placeholder();
        assert_eq!(meta.title, PLACEHOLDER_TITLE);
        assert!(meta.image_url.is_empty());
        assert!(meta.is_placeholder());
        assert!(!Metadata::new("Real", "").is_placeholder());
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(Metadata::new("T", "https://img")).unwrap();
        assert_eq!(json["imageUrl"], "https://img");
    }
}

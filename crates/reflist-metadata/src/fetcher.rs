//! External metadata lookup contract

use crate::error::FetchError;
use async_trait::async_trait;
use reflist_core::{Metadata, ReferenceId, PLACEHOLDER_TITLE};

/// What a lookup discovered; either field may be missing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchedMetadata {
    /// Page title, if one was found
    pub title: Option<String>,
    /// Preview image URL, if one was found
    pub image_url: Option<String>,
}

impl FetchedMetadata {
    /// Both fields present
    #[must_use]
    pub fn new(title: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            image_url: Some(image_url.into()),
        }
    }

    /// Whether nothing at all was discovered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.image_url.is_none()
    }

    /// Fill gaps with placeholder values
    #[must_use]
    pub fn into_metadata(self) -> Metadata {
        Metadata {
            title: self
                .title
                .filter(|title| !title.is_empty())
                .unwrap_or_else(|| PLACEHOLDER_TITLE.to_string()),
            image_url: self.image_url.unwrap_or_default(),
        }
    }
}

/// Resolves an id to metadata from some external source
///
/// Implementations may be slow and may fail; the cache absorbs both.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MetadataFetcher: Send + Sync {
    /// Look up one id; `url` is the item's page under the configured service
    async fn fetch(&self, id: ReferenceId, url: &str) -> Result<FetchedMetadata, FetchError>;
}

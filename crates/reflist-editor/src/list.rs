//! Ordered, key-addressed list of reference rows

use crate::error::IgnoreReason;
use reflist_core::{CanonicalEntry, ItemKey, ReferenceId, ReferenceItem};

/// In-memory list being edited
///
/// Rows are addressed by their [`ItemKey`], never by position or content.
/// User edits never shrink the list below one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceList {
    items: Vec<ReferenceItem>,
}

impl ReferenceList {
    /// Build the starting list from the host's stored value
    ///
    /// An absent or empty value yields a single blank row. Otherwise every
    /// entry becomes a row with a fresh key, in stored order.
    #[must_use]
    pub fn from_persisted(value: Option<Vec<CanonicalEntry>>) -> Self {
        match value {
            Some(entries) if !entries.is_empty() => Self {
                items: entries.into_iter().map(ReferenceItem::from_entry).collect(),
            },
            _ => Self {
                items: vec![ReferenceItem::blank()],
            },
        }
    }

    /// Wrap already-keyed rows
    ///
    /// Used for reconciled lists, which follow the canonical membership and
    /// may therefore be empty.
    #[must_use]
    pub fn from_items(items: Vec<ReferenceItem>) -> Self {
        Self { items }
    }

    /// Rows in order
    #[inline]
    #[must_use]
    pub fn items(&self) -> &[ReferenceItem] {
        &self.items
    }

    /// Number of rows
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether there are no rows
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Position of a row
    #[must_use]
    pub fn position(&self, key: ItemKey) -> Option<usize> {
        self.items.iter().position(|item| item.key() == key)
    }

    /// Row by key
    #[must_use]
    pub fn get(&self, key: ItemKey) -> Option<&ReferenceItem> {
        self.items.iter().find(|item| item.key() == key)
    }

    /// Present ids, in order, duplicates included
    pub fn ids(&self) -> impl Iterator<Item = ReferenceId> + '_ {
        self.items.iter().filter_map(ReferenceItem::id)
    }

    /// Insert a blank row right after `key`, returning the new row's key
    ///
    /// # Errors
    /// [`IgnoreReason::UnknownKey`] if no row has `key`
    pub fn insert_after(&mut self, key: ItemKey) -> Result<ItemKey, IgnoreReason> {
        let index = self.position(key).ok_or(IgnoreReason::UnknownKey)?;
        let item = ReferenceItem::blank();
        let new_key = item.key();
        self.items.insert(index + 1, item);
        Ok(new_key)
    }

    /// Remove the row with `key`
    ///
    /// # Errors
    /// [`IgnoreReason::LastItem`] when only one row is left,
    /// [`IgnoreReason::UnknownKey`] if no row has `key`
    pub fn remove(&mut self, key: ItemKey) -> Result<ReferenceItem, IgnoreReason> {
        if self.items.len() <= 1 {
            return Err(IgnoreReason::LastItem);
        }
        let index = self.position(key).ok_or(IgnoreReason::UnknownKey)?;
        Ok(self.items.remove(index))
    }

    /// Set a row's id from raw user input, returning the parsed id
    ///
    /// Input that is not a positive integer clears the id.
    ///
    /// # Errors
    /// [`IgnoreReason::UnknownKey`] if no row has `key`
    pub fn update_id(
        &mut self,
        key: ItemKey,
        raw: &str,
    ) -> Result<Option<ReferenceId>, IgnoreReason> {
        let id = ReferenceId::parse(raw);
        self.item_mut(key)?.set_id(id);
        Ok(id)
    }

    /// Replace a row's comment, or one locale of it
    ///
    /// # Errors
    /// [`IgnoreReason::UnknownKey`] if no row has `key`
    pub fn update_comment(
        &mut self,
        key: ItemKey,
        locale: Option<&str>,
        home_locale: &str,
        text: impl Into<String>,
    ) -> Result<(), IgnoreReason> {
        self.item_mut(key)?
            .comment_mut()
            .set(locale, home_locale, text);
        Ok(())
    }

    /// Persisted shape of the whole list
    #[must_use]
    pub fn to_entries(&self) -> Vec<CanonicalEntry> {
        self.items.iter().map(ReferenceItem::to_entry).collect()
    }

    fn item_mut(&mut self, key: ItemKey) -> Result<&mut ReferenceItem, IgnoreReason> {
        self.items
            .iter_mut()
            .find(|item| item.key() == key)
            .ok_or(IgnoreReason::UnknownKey)
    }
}

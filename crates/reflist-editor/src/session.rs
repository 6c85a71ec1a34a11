//! Editing session
//!
//! Owns the list for one field in one locale and wires the pieces together:
//! - user edits mutate the [`ReferenceList`]
//! - every applied edit goes through the [`PersistenceGate`]
//! - id changes start metadata lookups in the background
//! - outside the default locale, canonical changes flow into the [`Reconciler`]
//!
//! Mutating methods take `&mut self`, so edits to one list never interleave.

use crate::config::EditorConfig;
use crate::error::{EditorResult, IgnoreReason};
use crate::gate::{PersistOutcome, PersistenceGate};
use crate::list::ReferenceList;
use crate::reconcile::Reconciler;
use reflist_core::{
    CanonicalSnapshot, Comment, FieldContext, FieldHost, HostError, ItemKey, Metadata,
    ReferenceId, Subscription,
};
use reflist_metadata::MetadataCache;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Result of one edit or reconciliation pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// List changed in memory and the snapshot went through the gate
    Applied(PersistOutcome),
    /// List left untouched
    Ignored(IgnoreReason),
}

impl EditOutcome {
    /// Whether the list changed
    #[inline]
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }
}

/// Enrichment state of one row, for rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataState {
    /// Row has no id to look up
    NoId,
    /// Lookup not finished yet
    Loading,
    /// Resolved (possibly to the placeholder)
    Ready(Metadata),
}

/// Render model of one row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemView {
    /// Addressing key
    pub key: ItemKey,
    /// Referenced id
    pub id: Option<ReferenceId>,
    /// Commentary
    pub comment: Comment,
    /// Enrichment state
    pub metadata: MetadataState,
    /// Whether id, insert and remove controls are enabled
    pub structure_editable: bool,
}

/// Editor for one field in one locale
#[derive(Debug)]
pub struct EditorSession {
    context: FieldContext,
    list: ReferenceList,
    gate: PersistenceGate,
    metadata: MetadataCache,
    reconciler: Reconciler,
    subscription: Option<Subscription>,
    pending_lookups: Vec<JoinHandle<Metadata>>,
}

impl EditorSession {
    /// Open a session on the host's field
    ///
    /// Loads the stored value (a blank row if there is none). Outside the
    /// default locale, also subscribes to canonical changes and reconciles
    /// against the current canonical value right away.
    ///
    /// # Errors
    /// Host read or persist failures, or an unusable configuration
    pub async fn open(
        host: Arc<dyn FieldHost>,
        metadata: MetadataCache,
        config: &EditorConfig,
    ) -> EditorResult<Self> {
        config.check()?;
        let context = host.context();
        let list = ReferenceList::from_persisted(host.field_value().await?);

        tracing::info!(
            field = %context.field_id,
            locale = %context.locale,
            canonical = context.is_canonical(),
            items = list.len(),
            "opening editor session"
        );

        let subscription = if context.is_canonical() {
            None
        } else {
            Some(host.subscribe_canonical(config.canonical_buffer))
        };
        let initial_canonical = if context.is_canonical() {
            None
        } else {
            host.canonical_value().await?
        };

        let mut session = Self {
            gate: PersistenceGate::new(host, config.validation_policy),
            context,
            list,
            metadata,
            reconciler: Reconciler::new(),
            subscription,
            pending_lookups: Vec::new(),
        };

        match initial_canonical {
            Some(entries) => {
                session.apply_canonical(CanonicalSnapshot::new(entries)).await?;
            }
            None => session.prefetch_all(),
        }

        Ok(session)
    }

    /// Field and locale being edited
    #[inline]
    #[must_use]
    pub fn context(&self) -> &FieldContext {
        &self.context
    }

    /// Whether ids, order and membership may be edited here
    #[inline]
    #[must_use]
    pub fn structure_editable(&self) -> bool {
        self.context.is_canonical()
    }

    /// Current list
    #[inline]
    #[must_use]
    pub fn list(&self) -> &ReferenceList {
        &self.list
    }

    /// Shared metadata cache
    #[inline]
    #[must_use]
    pub fn metadata(&self) -> &MetadataCache {
        &self.metadata
    }

    /// Insert a blank row after `key`
    ///
    /// # Errors
    /// Host persist failure; the row stays inserted
    pub async fn insert_after(&mut self, key: ItemKey) -> EditorResult<EditOutcome> {
        if !self.structure_editable() {
            return Ok(self.ignored(IgnoreReason::ReadOnlyStructure));
        }
        match self.list.insert_after(key) {
            Ok(new_key) => {
                tracing::debug!(after = %key, key = %new_key, "row inserted");
                self.commit().await
            }
            Err(reason) => Ok(self.ignored(reason)),
        }
    }

    /// Remove the row with `key`, unless it is the last one
    ///
    /// # Errors
    /// Host persist failure; the row stays removed
    pub async fn remove(&mut self, key: ItemKey) -> EditorResult<EditOutcome> {
        if !self.structure_editable() {
            return Ok(self.ignored(IgnoreReason::ReadOnlyStructure));
        }
        match self.list.remove(key) {
            Ok(_) => {
                tracing::debug!(%key, "row removed");
                self.commit().await
            }
            Err(reason) => Ok(self.ignored(reason)),
        }
    }

    /// Set a row's id from raw input and start its metadata lookup
    ///
    /// # Errors
    /// Host persist failure; the id stays changed
    pub async fn update_id(&mut self, key: ItemKey, raw: &str) -> EditorResult<EditOutcome> {
        if !self.structure_editable() {
            return Ok(self.ignored(IgnoreReason::ReadOnlyStructure));
        }
        match self.list.update_id(key, raw) {
            Ok(id) => {
                tracing::debug!(%key, id = ?id, "id changed");
                if let Some(id) = id {
                    self.prefetch(id);
                }
                self.commit().await
            }
            Err(reason) => Ok(self.ignored(reason)),
        }
    }

    /// Replace a row's comment, or the text of one locale
    ///
    /// Existing plain text is kept under this session's locale when a
    /// per-locale write first turns it into a mapping.
    ///
    /// # Errors
    /// Host persist failure; the comment stays changed
    pub async fn update_comment(
        &mut self,
        key: ItemKey,
        locale: Option<&str>,
        text: impl Into<String>,
    ) -> EditorResult<EditOutcome> {
        match self
            .list
            .update_comment(key, locale, &self.context.locale, text)
        {
            Ok(()) => {
                tracing::debug!(%key, locale = ?locale, "comment changed");
                self.commit().await
            }
            Err(reason) => Ok(self.ignored(reason)),
        }
    }

    /// Reconcile against a canonical value and persist the result
    ///
    /// # Errors
    /// Host persist failure; the reconciled list is kept
    pub async fn apply_canonical(
        &mut self,
        canonical: CanonicalSnapshot,
    ) -> EditorResult<EditOutcome> {
        if self.context.is_canonical() {
            return Ok(self.ignored(IgnoreReason::CanonicalSession));
        }
        let Some(reconciled) = self.reconciler.reconcile(&self.list, &canonical) else {
            return Ok(self.ignored(IgnoreReason::AlreadyProcessed));
        };
        self.list = reconciled;
        self.prefetch_all();
        self.commit().await
    }

    /// Wait for the next canonical change and apply it
    ///
    /// Returns `None` in the default locale and after [`close`](Self::close).
    /// When the host stops publishing, reports
    /// [`HostError::SubscriptionClosed`] once and then returns `None`.
    pub async fn sync_next(&mut self) -> Option<EditorResult<EditOutcome>> {
        match self.subscription.as_mut()?.next().await {
            Some(snapshot) => Some(self.apply_canonical(snapshot).await),
            None => {
                self.subscription = None;
                tracing::warn!(locale = %self.context.locale, "default locale stopped publishing");
                Some(Err(HostError::SubscriptionClosed.into()))
            }
        }
    }

    /// Wait for every lookup started by this session so far
    pub async fn settle_metadata(&mut self) {
        let pending = std::mem::take(&mut self.pending_lookups);
        futures::future::join_all(pending).await;
    }

    /// Render model of every row, in order
    pub async fn views(&self) -> Vec<ItemView> {
        let mut views = Vec::with_capacity(self.list.len());
        for item in self.list.items() {
            let metadata = match item.id() {
                None => MetadataState::NoId,
                Some(id) => self
                    .metadata
                    .peek(id)
                    .await
                    .map_or(MetadataState::Loading, MetadataState::Ready),
            };
            views.push(ItemView {
                key: item.key(),
                id: item.id(),
                comment: item.comment().clone(),
                metadata,
                structure_editable: self.structure_editable(),
            });
        }
        views
    }

    /// Stop following canonical changes
    pub fn close(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
            tracing::debug!(locale = %self.context.locale, "unsubscribed from default locale");
        }
    }

    async fn commit(&mut self) -> EditorResult<EditOutcome> {
        let outcome = self.gate.submit(self.list.to_entries()).await?;
        Ok(EditOutcome::Applied(outcome))
    }

    fn ignored(&self, reason: IgnoreReason) -> EditOutcome {
        tracing::debug!(locale = %self.context.locale, %reason, "edit ignored");
        EditOutcome::Ignored(reason)
    }

    fn prefetch(&mut self, id: ReferenceId) {
        self.pending_lookups.retain(|handle| !handle.is_finished());
        if let Some(handle) = self.metadata.prefetch(id) {
            self.pending_lookups.push(handle);
        }
    }

    fn prefetch_all(&mut self) {
        let ids: Vec<_> = self.list.ids().collect();
        for id in ids {
            self.prefetch(id);
        }
    }
}

//! Cross-locale list reconciliation
//!
//! A non-default locale keeps its own commentary but takes ids, order and
//! membership from the default locale. Each time the canonical value
//! changes, the local list is rebuilt in canonical order, carrying forward
//! local rows whose id survives.

use crate::list::ReferenceList;
use reflist_core::{CanonicalEntry, CanonicalSnapshot, ReferenceId, ReferenceItem};
use std::collections::HashMap;

/// Tracks the last canonical value seen so echoes are not reprocessed
#[derive(Debug, Default)]
pub struct Reconciler {
    last_seen: Option<CanonicalSnapshot>,
}

impl Reconciler {
    /// Create a reconciler that has seen nothing yet
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild `local` against a canonical value
    ///
    /// Returns `None` when `canonical` is the very snapshot processed last
    /// time (reference identity), otherwise the reconciled list.
    pub fn reconcile(
        &mut self,
        local: &ReferenceList,
        canonical: &CanonicalSnapshot,
    ) -> Option<ReferenceList> {
        if self
            .last_seen
            .as_ref()
            .is_some_and(|seen| seen.same_as(canonical))
        {
            return None;
        }
        self.last_seen = Some(canonical.clone());

        let merged = merge(local.items(), canonical);
        tracing::info!(
            local = local.len(),
            canonical = canonical.len(),
            reconciled = merged.len(),
            "reconciled against default locale"
        );
        Some(ReferenceList::from_items(merged))
    }
}

/// Merge canonical structure with local rows
///
/// - canonical entries without an id are dropped
/// - an id present locally carries that local row (key and comment) forward
/// - an unknown id becomes a fresh row with an empty comment
///
/// Each local row is carried at most once, so a canonical id listed twice
/// yields the local row followed by a fresh row. When the local list holds
/// an id twice, the later row is the one carried.
#[must_use]
pub fn merge(local: &[ReferenceItem], canonical: &[CanonicalEntry]) -> Vec<ReferenceItem> {
    let mut by_id: HashMap<ReferenceId, &ReferenceItem> = local
        .iter()
        .filter_map(|item| item.id().map(|id| (id, item)))
        .collect();

    canonical
        .iter()
        .filter_map(|entry| entry.id)
        .map(|id| match by_id.remove(&id) {
            Some(existing) => existing.clone(),
            None => ReferenceItem::with_id(Some(id)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use reflist_core::Comment;

    fn id(raw: i64) -> Option<ReferenceId> {
        Some(ReferenceId::new(raw))
    }

    fn local(entries: &[(i64, &str)]) -> ReferenceList {
        ReferenceList::from_persisted(Some(
            entries
                .iter()
                .map(|(raw, comment)| CanonicalEntry::new(id(*raw), *comment))
                .collect(),
        ))
    }

    fn canonical(entries: &[(Option<i64>, &str)]) -> CanonicalSnapshot {
        CanonicalSnapshot::new(
            entries
                .iter()
                .map(|(raw, comment)| CanonicalEntry::new(raw.map(ReferenceId::new), *comment))
                .collect(),
        )
    }

    #[test]
    fn keeps_local_comment() {
        let list = local(&[(1, "A")]);
        let result = Reconciler::new()
            .reconcile(&list, &canonical(&[(Some(1), "B")]))
            .unwrap();

        assert_eq!(result.items()[0].comment(), &Comment::from("A"));
        assert_eq!(result.items()[0].key(), list.items()[0].key());
    }

    #[test]
    fn drops_ids_missing_from_canonical() {
        let list = local(&[(1, "one"), (2, "two")]);
        let result = Reconciler::new()
            .reconcile(&list, &canonical(&[(Some(2), "")]))
            .unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result.items()[0].id(), id(2));
        assert_eq!(result.items()[0].key(), list.items()[1].key());
        assert_eq!(result.items()[0].comment(), &Comment::from("two"));
    }

    #[test]
    fn adds_new_ids_with_empty_comment() {
        let list = local(&[(1, "one")]);
        let result = Reconciler::new()
            .reconcile(&list, &canonical(&[(Some(1), ""), (Some(2), "canonical text")]))
            .unwrap();

        assert_eq!(result.len(), 2);
        let added = &result.items()[1];
        assert_eq!(added.id(), id(2));
        assert!(added.comment().is_empty());
        assert_ne!(added.key(), list.items()[0].key());
    }

    #[test]
    fn follows_canonical_order() {
        let list = local(&[(1, "one"), (2, "two"), (3, "three")]);
        let result = Reconciler::new()
            .reconcile(&list, &canonical(&[(Some(3), ""), (Some(1), ""), (Some(2), "")]))
            .unwrap();

        assert_eq!(
            result.to_entries(),
            vec![
                CanonicalEntry::new(id(3), "three"),
                CanonicalEntry::new(id(1), "one"),
                CanonicalEntry::new(id(2), "two"),
            ]
        );
    }

    #[test]
    fn drops_canonical_rows_without_id() {
        let list = local(&[(1, "one")]);
        let result = Reconciler::new()
            .reconcile(&list, &canonical(&[(None, "draft"), (Some(1), "")]))
            .unwrap();
        assert_eq!(result.to_entries(), vec![CanonicalEntry::new(id(1), "one")]);

        let result = Reconciler::new()
            .reconcile(&list, &canonical(&[(None, "")]))
            .unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn duplicate_canonical_ids_get_distinct_keys() {
        let list = local(&[(5, "five")]);
        let result = Reconciler::new()
            .reconcile(&list, &canonical(&[(Some(5), ""), (Some(5), "")]))
            .unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result.items()[0].key(), list.items()[0].key());
        assert_eq!(result.items()[0].comment(), &Comment::from("five"));
        assert_ne!(result.items()[1].key(), result.items()[0].key());
        assert!(result.items()[1].comment().is_empty());
    }

    #[test]
    fn same_snapshot_is_processed_once() {
        let list = local(&[(1, "one")]);
        let snapshot = canonical(&[(Some(1), "")]);
        let mut reconciler = Reconciler::new();

        assert!(reconciler.reconcile(&list, &snapshot).is_some());
        assert!(reconciler.reconcile(&list, &snapshot.clone()).is_none());

        let equal_but_new = canonical(&[(Some(1), "")]);
        assert!(reconciler.reconcile(&list, &equal_but_new).is_some());
    }
}

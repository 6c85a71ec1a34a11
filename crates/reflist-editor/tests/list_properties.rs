//! ReferenceList property tests
//!
use proptest::prelude::*;
use reflist_core::{CanonicalEntry, CanonicalSnapshot, ReferenceId};
use reflist_editor::{IgnoreReason, Reconciler, ReferenceList};
use std::collections::HashSet;

fn stored_value() -> impl Strategy<Value = Vec<CanonicalEntry>> {
    prop::collection::vec(
        (prop::option::of(1i64..20), "[a-z]{0,6}")
            .prop_map(|(id, comment)| CanonicalEntry::new(id.map(ReferenceId::new), comment)),
        1..12,
    )
}

fn distinct_keys(list: &ReferenceList) -> bool {
    let keys: HashSet<_> = list.items().iter().map(|item| item.key()).collect();
    keys.len() == list.len()
}

proptest! {
    #[test]
    fn remove_never_empties_single_row(value in stored_value(), pick in any::<prop::sample::Index>()) {
        let mut list = ReferenceList::from_persisted(Some(value[..1].to_vec()));
        let key = list.items()[pick.index(list.len())].key();

        prop_assert_eq!(list.remove(key), Err(IgnoreReason::LastItem));
        prop_assert_eq!(list.len(), 1);
    }

    #[test]
    fn insert_after_adds_one_fresh_row_next(value in stored_value(), pick in any::<prop::sample::Index>()) {
        let mut list = ReferenceList::from_persisted(Some(value));
        let before = list.len();
        let index = pick.index(before);
        let anchor = list.items()[index].key();

        let new_key = list.insert_after(anchor).unwrap();

        prop_assert_eq!(list.len(), before + 1);
        prop_assert_eq!(list.position(new_key), Some(index + 1));
        prop_assert!(distinct_keys(&list));
    }

    #[test]
    fn remove_shrinks_by_one_above_floor(value in stored_value(), pick in any::<prop::sample::Index>()) {
        prop_assume!(value.len() > 1);
        let mut list = ReferenceList::from_persisted(Some(value));
        let before = list.len();
        let key = list.items()[pick.index(before)].key();

        prop_assert!(list.remove(key).is_ok());
        prop_assert_eq!(list.len(), before - 1);
        prop_assert!(list.get(key).is_none());
    }

    #[test]
    fn reconciled_list_matches_canonical_ids(local in stored_value(), canonical in stored_value()) {
        let list = ReferenceList::from_persisted(Some(local));
        let snapshot = CanonicalSnapshot::new(canonical.clone());

        let reconciled = Reconciler::new().reconcile(&list, &snapshot).unwrap();

        let expected: Vec<_> = canonical.iter().filter_map(|entry| entry.id).collect();
        prop_assert_eq!(reconciled.ids().collect::<Vec<_>>(), expected);
        prop_assert!(distinct_keys(&reconciled));
    }

    #[test]
    fn reconciled_rows_keep_local_comments(local in stored_value(), canonical in stored_value()) {
        let list = ReferenceList::from_persisted(Some(local));
        let snapshot = CanonicalSnapshot::new(canonical);

        let reconciled = Reconciler::new().reconcile(&list, &snapshot).unwrap();

        for item in reconciled.items() {
            match list.get(item.key()) {
                Some(original) => prop_assert_eq!(original, item),
                None => prop_assert!(item.comment().is_empty()),
            }
        }
    }
}

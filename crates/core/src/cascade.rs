//! Release cascade rules between a requisition header and its items.
//!
//! Releasing a header releases every item under it. Un-releasing an item forces
//! the header back to un-released, but only the first item of a batch is checked.
//!
//! These functions decide *what* to write; sending the writes is the
//! orchestrator's job.

use crate::document::HeaderInput;
use crate::requisition::{Item, ReleaseFlag};

/// Which side of the cascade failed to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateFailure {
    Header,
    Item,
}

impl UpdateFailure {
    pub fn message(&self) -> &'static str {
        match self {
            UpdateFailure::Header => "Header Data cannot release",
            UpdateFailure::Item => "Item Data cannot release",
        }
    }
}

/// Whether writing `flag` to a header must also be written to all of its items.
///
/// Un-releasing (or leaving unset) a header never touches its items.
pub fn header_release_cascades(flag: ReleaseFlag) -> bool {
    flag == Some(true)
}

/// Overwrite the flag of every stored item with the header's new flag.
pub fn cascade_to_items(items: Vec<Item>, flag: ReleaseFlag) -> Vec<Item> {
    items.into_iter().map(|item| item.with_released(flag)).collect()
}

/// Update records for an item-triggered change, in input order.
///
/// Each record combines the parent key with the item's own key and flag.
pub fn item_updates(header: &HeaderInput) -> Vec<Item> {
    header
        .item
        .iter()
        .map(|entry| {
            Item::new(
                header.purchase_requisition,
                entry.purchase_requisition_item,
                entry.is_released,
            )
        })
        .collect()
}

/// Whether an item batch forces its header to un-released.
///
/// Only the first entry is inspected. An empty batch or an unset flag forces nothing.
pub fn batch_forces_header_unrelease(header: &HeaderInput) -> bool {
    header
        .item
        .first()
        .is_some_and(|entry| entry.is_released == Some(false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ItemInput;
    use crate::id::{PurchaseRequisitionId, PurchaseRequisitionItemId};
    use proptest::prelude::*;

    fn header_input(items: &[(i32, ReleaseFlag)]) -> HeaderInput {
        HeaderInput {
            purchase_requisition: PurchaseRequisitionId::new(100),
            is_released: None,
            item: items
                .iter()
                .map(|(key, flag)| ItemInput {
                    purchase_requisition_item: PurchaseRequisitionItemId::new(*key),
                    is_released: *flag,
                })
                .collect(),
        }
    }

    fn flag_strategy() -> impl Strategy<Value = ReleaseFlag> {
        prop_oneof![Just(None), Just(Some(true)), Just(Some(false))]
    }

    #[test]
    fn only_release_cascades_from_header() {
        assert!(header_release_cascades(Some(true)));
        assert!(!header_release_cascades(Some(false)));
        assert!(!header_release_cascades(None));
    }

    #[test]
    fn item_updates_carry_parent_key_and_own_flag() {
        let header = header_input(&[(10, Some(false)), (20, Some(true))]);
        let updates = item_updates(&header);

        assert_eq!(updates.len(), 2);
        assert!(updates.iter().all(|i| i.purchase_requisition.get() == 100));
        assert_eq!(updates[0].purchase_requisition_item.get(), 10);
        assert_eq!(updates[0].is_released, Some(false));
        assert_eq!(updates[1].is_released, Some(true));
    }

    #[test]
    fn only_first_item_decides_header_unrelease() {
        assert!(batch_forces_header_unrelease(&header_input(&[(10, Some(false)), (20, Some(true))])));
        assert!(!batch_forces_header_unrelease(&header_input(&[(10, Some(true)), (20, Some(false))])));
        assert!(!batch_forces_header_unrelease(&header_input(&[(10, None)])));
        assert!(!batch_forces_header_unrelease(&header_input(&[])));
    }

    #[test]
    fn failure_messages() {
        assert_eq!(UpdateFailure::Header.message(), "Header Data cannot release");
        assert_eq!(UpdateFailure::Item.message(), "Item Data cannot release");
    }

    proptest! {
        #[test]
        fn released_header_releases_every_item(
            keys in proptest::collection::vec(1i32..10_000, 0..16),
            stored in proptest::collection::vec(flag_strategy(), 16),
        ) {
            let items: Vec<Item> = keys
                .iter()
                .zip(stored.iter())
                .map(|(k, f)| Item::new(PurchaseRequisitionId::new(100), PurchaseRequisitionItemId::new(*k), *f))
                .collect();
            let count = items.len();

            let cascaded = cascade_to_items(items, Some(true));

            prop_assert_eq!(cascaded.len(), count);
            prop_assert!(cascaded.iter().all(|i| i.is_released == Some(true)));
        }

        #[test]
        fn leading_unrelease_always_forces_header(
            rest in proptest::collection::vec((1i32..10_000, flag_strategy()), 0..8),
        ) {
            let mut entries = vec![(1, Some(false))];
            entries.extend(rest);
            prop_assert!(batch_forces_header_unrelease(&header_input(&entries)));
        }
    }
}

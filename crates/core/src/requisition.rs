//! Purchase requisition rows as they travel to the SQL executor.
//!
//! Field names serialize in the column casing the SQL executor expects
//! (`PurchaseRequisition`, `IsReleased`, ...).

use serde::{Deserialize, Serialize};

use crate::id::{PurchaseRequisitionId, PurchaseRequisitionItemId};

/// Tri-state release flag.
///
/// `Some(true)` is released, `Some(false)` is un-released and `None` means the
/// change did not state a release status at all. `None` is never read as `false`.
pub type ReleaseFlag = Option<bool>;

/// Header row of a purchase requisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Header {
    pub purchase_requisition: PurchaseRequisitionId,
    #[serde(default)]
    pub is_released: ReleaseFlag,
}

impl Header {
    pub fn new(purchase_requisition: PurchaseRequisitionId, is_released: ReleaseFlag) -> Self {
        Self {
            purchase_requisition,
            is_released,
        }
    }

    /// Overwrite the release flag, returning the updated row.
    pub fn with_released(mut self, is_released: ReleaseFlag) -> Self {
        self.is_released = is_released;
        self
    }
}

/// Line item row of a purchase requisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Item {
    pub purchase_requisition: PurchaseRequisitionId,
    pub purchase_requisition_item: PurchaseRequisitionItemId,
    #[serde(default)]
    pub is_released: ReleaseFlag,
}

impl Item {
    pub fn new(
        purchase_requisition: PurchaseRequisitionId,
        purchase_requisition_item: PurchaseRequisitionItemId,
        is_released: ReleaseFlag,
    ) -> Self {
        Self {
            purchase_requisition,
            purchase_requisition_item,
            is_released,
        }
    }

    pub fn with_released(mut self, is_released: ReleaseFlag) -> Self {
        self.is_released = is_released;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn header_serializes_with_column_names() {
        let header = Header::new(PurchaseRequisitionId::new(100), Some(true));
        assert_eq!(
            serde_json::to_value(header).unwrap(),
            json!({ "PurchaseRequisition": 100, "IsReleased": true })
        );
    }

    #[test]
    fn unset_flag_serializes_as_null_and_reads_back_as_none() {
        let item = Item::new(
            PurchaseRequisitionId::new(100),
            PurchaseRequisitionItemId::new(10),
            None,
        );
        let value = serde_json::to_value(item).unwrap();
        assert_eq!(value["IsReleased"], serde_json::Value::Null);

        let missing: Item =
            serde_json::from_value(json!({ "PurchaseRequisition": 100, "PurchaseRequisitionItem": 10 }))
                .unwrap();
        assert_eq!(missing.is_released, None);
    }

    #[test]
    fn with_released_only_touches_the_flag() {
        let item = Item::new(
            PurchaseRequisitionId::new(7),
            PurchaseRequisitionItemId::new(3),
            Some(true),
        )
        .with_released(Some(false));
        assert_eq!(item.purchase_requisition.get(), 7);
        assert_eq!(item.purchase_requisition_item.get(), 3);
        assert_eq!(item.is_released, Some(false));
    }
}

//! In-memory row reader for tests/dev.

use std::collections::BTreeMap;
use std::sync::RwLock;

use requisition_releases_core::{Header, Item, PurchaseRequisitionId, PurchaseRequisitionItemId};

use super::RowReader;

/// In-memory requisition rows.
///
/// Items are kept ordered by item key, matching the ordering of the Postgres reader.
#[derive(Debug, Default)]
pub struct InMemoryRowReader {
    headers: RwLock<BTreeMap<PurchaseRequisitionId, Header>>,
    items: RwLock<BTreeMap<(PurchaseRequisitionId, PurchaseRequisitionItemId), Item>>,
}

impl InMemoryRowReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_header(&self, header: Header) {
        if let Ok(mut headers) = self.headers.write() {
            headers.insert(header.purchase_requisition, header);
        }
    }

    pub fn insert_item(&self, item: Item) {
        if let Ok(mut items) = self.items.write() {
            items.insert((item.purchase_requisition, item.purchase_requisition_item), item);
        }
    }

    /// Builder-style seeding for tests.
    pub fn with_header(self, header: Header) -> Self {
        self.insert_header(header);
        self
    }

    pub fn with_item(self, item: Item) -> Self {
        self.insert_item(item);
        self
    }
}

#[async_trait::async_trait]
impl RowReader for InMemoryRowReader {
    async fn read_header(&self, key: PurchaseRequisitionId) -> Option<Header> {
        self.headers.read().ok()?.get(&key).copied()
    }

    async fn read_items(&self, key: PurchaseRequisitionId) -> Vec<Item> {
        // Mirrors the INNER JOIN: items without a stored header are not returned.
        let header_exists = self
            .headers
            .read()
            .map(|headers| headers.contains_key(&key))
            .unwrap_or(false);
        if !header_exists {
            return vec![];
        }

        match self.items.read() {
            Ok(items) => items
                .values()
                .filter(|item| item.purchase_requisition == key)
                .copied()
                .collect(),
            Err(_) => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pr(key: i32) -> PurchaseRequisitionId {
        PurchaseRequisitionId::new(key)
    }

    fn item(parent: i32, key: i32) -> Item {
        Item::new(pr(parent), PurchaseRequisitionItemId::new(key), Some(false))
    }

    #[tokio::test]
    async fn missing_header_reads_as_none() {
        let reader = InMemoryRowReader::new();
        assert_eq!(reader.read_header(pr(1)).await, None);
    }

    #[tokio::test]
    async fn items_are_scoped_to_requisition_and_ordered_by_key() {
        let reader = InMemoryRowReader::new()
            .with_header(Header::new(pr(100), None))
            .with_header(Header::new(pr(200), None))
            .with_item(item(100, 20))
            .with_item(item(200, 5))
            .with_item(item(100, 10));

        let keys: Vec<i32> = reader
            .read_items(pr(100))
            .await
            .iter()
            .map(|i| i.purchase_requisition_item.get())
            .collect();
        assert_eq!(keys, vec![10, 20]);
    }

    #[tokio::test]
    async fn orphan_items_are_not_joined() {
        let reader = InMemoryRowReader::new().with_item(item(300, 1));
        assert!(reader.read_items(pr(300)).await.is_empty());
    }
}

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::OrderId;
use domain::{Order, OrderStatus};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{OrderRecord, OrderRepository, Result, StoreError};

/// In-memory order repository for testing.
///
/// Stores serialized records and goes through the same record mapping as
/// the PostgreSQL implementation, so the read-after-write reconstruction
/// guarantee is exercised in tests too.
#[derive(Clone, Default)]
pub struct InMemoryOrderRepository {
    records: Arc<RwLock<HashMap<Uuid, OrderRecord>>>,
}

impl InMemoryOrderRepository {
    /// Creates a new empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of stored orders.
    pub async fn order_count(&self) -> usize {
        self.records.read().await.len()
    }

    /// Clears all stored orders.
    pub async fn clear(&self) {
        self.records.write().await.clear();
    }

    fn sorted_records(records: &HashMap<Uuid, OrderRecord>) -> Vec<OrderRecord> {
        let mut all: Vec<_> = records.values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        all
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn save(&self, order: &Order) -> Result<Order> {
        let id = order.id().as_uuid();
        let expected = order.version();

        let mut records = self.records.write().await;

        let actual = records.get(&id).map(|r| r.version).unwrap_or(0);
        if actual != expected {
            return Err(StoreError::ConcurrencyConflict {
                order_id: order.id(),
                expected,
                actual,
            });
        }

        let record = OrderRecord::from_order(order, expected + 1);
        records.insert(id, record.clone());

        // Read-after-write: reconstruct from what was actually stored.
        record.into_order()
    }

    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>> {
        let records = self.records.read().await;
        match records.get(&id.as_uuid()).cloned() {
            Some(record) => Ok(Some(record.into_order()?)),
            None => Ok(None),
        }
    }

    async fn find_by_status(&self, status: OrderStatus) -> Result<Vec<Order>> {
        let records = self.records.read().await;
        Self::sorted_records(&records)
            .into_iter()
            .filter(|r| r.status == status.as_str())
            .map(OrderRecord::into_order)
            .collect()
    }

    async fn find_all(
        &self,
        skip: usize,
        limit: usize,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>> {
        let records = self.records.read().await;
        Self::sorted_records(&records)
            .into_iter()
            .filter(|r| match status {
                Some(status) => r.status == status.as_str(),
                None => true,
            })
            .skip(skip)
            .take(limit)
            .map(OrderRecord::into_order)
            .collect()
    }

    async fn delete(&self, id: OrderId) -> Result<bool> {
        let mut records = self.records.write().await;
        Ok(records.remove(&id.as_uuid()).is_some())
    }

    async fn exists_by_id(&self, id: OrderId) -> Result<bool> {
        let records = self.records.read().await;
        Ok(records.contains_key(&id.as_uuid()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{ClientId, Money, OrderItem};

    fn placed_order() -> Order {
        Order::place(
            ClientId::new(),
            None,
            vec![OrderItem::new("SKU001", 2, Money::from_cents(1000)).unwrap()],
        )
        .unwrap()
    }

    #[tokio::test]
    async fn save_inserts_and_bumps_version() {
        let repo = InMemoryOrderRepository::new();
        let order = placed_order();

        let saved = repo.save(&order).await.unwrap();
        assert_eq!(saved.version(), 1);
        assert_eq!(repo.order_count().await, 1);
    }

    #[tokio::test]
    async fn save_then_find_roundtrips() {
        let repo = InMemoryOrderRepository::new();
        let order = placed_order();

        repo.save(&order).await.unwrap();
        let found = repo.find_by_id(order.id()).await.unwrap().unwrap();

        assert_eq!(found.id(), order.id());
        assert_eq!(found.items(), order.items());
        assert_eq!(found.status(), order.status());
        assert_eq!(found.totals(), order.totals());
    }

    #[tokio::test]
    async fn save_is_an_upsert() {
        let repo = InMemoryOrderRepository::new();
        let order = placed_order();

        let mut saved = repo.save(&order).await.unwrap();
        saved.confirm().unwrap();
        let saved = repo.save(&saved).await.unwrap();

        assert_eq!(saved.status(), OrderStatus::Confirmed);
        assert_eq!(saved.version(), 2);
        assert_eq!(repo.order_count().await, 1);
    }

    #[tokio::test]
    async fn stale_save_is_rejected() {
        let repo = InMemoryOrderRepository::new();
        let order = placed_order();

        let first = repo.save(&order).await.unwrap();

        // Two handlers load the same version.
        let mut writer_a = first.clone();
        let mut writer_b = first;

        writer_a.confirm().unwrap();
        repo.save(&writer_a).await.unwrap();

        writer_b.cancel().unwrap();
        let result = repo.save(&writer_b).await;
        assert!(matches!(
            result,
            Err(StoreError::ConcurrencyConflict {
                expected: 1,
                actual: 2,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn find_by_id_returns_none_for_unknown() {
        let repo = InMemoryOrderRepository::new();
        let found = repo.find_by_id(OrderId::new()).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn find_by_status_filters() {
        let repo = InMemoryOrderRepository::new();

        let placed = placed_order();
        repo.save(&placed).await.unwrap();

        let mut confirmed = repo.save(&placed_order()).await.unwrap();
        confirmed.confirm().unwrap();
        repo.save(&confirmed).await.unwrap();

        let found = repo.find_by_status(OrderStatus::Confirmed).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id(), confirmed.id());

        let found = repo.find_by_status(OrderStatus::Shipped).await.unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn find_all_paginates() {
        let repo = InMemoryOrderRepository::new();
        for _ in 0..5 {
            repo.save(&placed_order()).await.unwrap();
        }

        let page = repo.find_all(0, 2, None).await.unwrap();
        assert_eq!(page.len(), 2);

        let rest = repo.find_all(2, 10, None).await.unwrap();
        assert_eq!(rest.len(), 3);

        let filtered = repo.find_all(0, 10, Some(OrderStatus::Placed)).await.unwrap();
        assert_eq!(filtered.len(), 5);

        let none = repo
            .find_all(0, 10, Some(OrderStatus::Cancelled))
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn delete_removes_record() {
        let repo = InMemoryOrderRepository::new();
        let order = placed_order();
        repo.save(&order).await.unwrap();

        assert!(repo.delete(order.id()).await.unwrap());
        assert!(!repo.delete(order.id()).await.unwrap());
        assert!(!repo.exists_by_id(order.id()).await.unwrap());
    }

    #[tokio::test]
    async fn exists_by_id() {
        let repo = InMemoryOrderRepository::new();
        let order = placed_order();

        assert!(!repo.exists_by_id(order.id()).await.unwrap());
        repo.save(&order).await.unwrap();
        assert!(repo.exists_by_id(order.id()).await.unwrap());
    }
}

use async_trait::async_trait;
use common::OrderId;
use domain::{Order, OrderStatus};

use crate::Result;

/// Persistence port for order aggregates.
///
/// Implementations are free to choose any durable keyed store with
/// query-by-field capability; the application layer depends only on this
/// trait and is given an implementation at composition time.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persists the order as a versioned upsert and returns the aggregate
    /// reconstructed from what was actually stored.
    ///
    /// Insert when no record with the order's ID exists (the aggregate must
    /// be at version 0), update every mutable field otherwise. The update is
    /// conditional on the stored version matching the aggregate's; a
    /// mismatch fails with [`StoreError::ConcurrencyConflict`] so concurrent
    /// writers cannot silently overwrite each other.
    ///
    /// The read-after-write reconstruction is a contract guarantee: callers
    /// never observe a value that diverges from what is durably stored.
    ///
    /// [`StoreError::ConcurrencyConflict`]: crate::StoreError::ConcurrencyConflict
    async fn save(&self, order: &Order) -> Result<Order>;

    /// Loads an order by ID, or `None` if it does not exist.
    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>>;

    /// Loads all orders in the given status, oldest first.
    async fn find_by_status(&self, status: OrderStatus) -> Result<Vec<Order>>;

    /// Loads orders oldest first with skip/limit pagination and an optional
    /// status filter.
    async fn find_all(
        &self,
        skip: usize,
        limit: usize,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>>;

    /// Deletes an order, returning true if a record was removed.
    async fn delete(&self, id: OrderId) -> Result<bool>;

    /// Returns true if an order with the given ID exists.
    async fn exists_by_id(&self, id: OrderId) -> Result<bool>;
}

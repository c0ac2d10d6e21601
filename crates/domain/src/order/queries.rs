//! Order queries.
//!
//! Plain intent carriers describing a requested read. Queries never mutate
//! state and never publish events.

use common::OrderId;

use super::OrderStatus;

/// Default page size applied when a query does not set a limit.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Query for a single order by ID. Not-found is a domain error.
#[derive(Debug, Clone)]
pub struct GetOrderById {
    /// The order to fetch.
    pub order_id: OrderId,
}

impl GetOrderById {
    /// Creates a new GetOrderById query.
    pub fn new(order_id: OrderId) -> Self {
        Self { order_id }
    }
}

/// Query for orders in a given status, paginated.
#[derive(Debug, Clone)]
pub struct GetOrdersByStatus {
    /// Status to filter on.
    pub status: OrderStatus,

    /// Number of matching orders to skip.
    pub skip: usize,

    /// Maximum number of orders to return.
    pub limit: usize,
}

impl GetOrdersByStatus {
    /// Creates a new GetOrdersByStatus query with the default page size.
    pub fn new(status: OrderStatus) -> Self {
        Self {
            status,
            skip: 0,
            limit: DEFAULT_PAGE_SIZE,
        }
    }

    /// Sets the pagination window.
    pub fn paginate(mut self, skip: usize, limit: usize) -> Self {
        self.skip = skip;
        self.limit = limit;
        self
    }
}

/// Query for all orders, optionally filtered by status, paginated.
#[derive(Debug, Clone)]
pub struct ListOrders {
    /// Optional status filter.
    pub status: Option<OrderStatus>,

    /// Number of matching orders to skip.
    pub skip: usize,

    /// Maximum number of orders to return.
    pub limit: usize,
}

impl ListOrders {
    /// Creates a new unfiltered ListOrders query with the default page size.
    pub fn new() -> Self {
        Self {
            status: None,
            skip: 0,
            limit: DEFAULT_PAGE_SIZE,
        }
    }

    /// Filters on the given status.
    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the pagination window.
    pub fn paginate(mut self, skip: usize, limit: usize) -> Self {
        self.skip = skip;
        self.limit = limit;
        self
    }
}

impl Default for ListOrders {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn by_status_defaults_to_first_page() {
        let query = GetOrdersByStatus::new(OrderStatus::Placed);
        assert_eq!(query.skip, 0);
        assert_eq!(query.limit, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn pagination_builder() {
        let query = ListOrders::new()
            .with_status(OrderStatus::Shipped)
            .paginate(20, 10);
        assert_eq!(query.status, Some(OrderStatus::Shipped));
        assert_eq!(query.skip, 20);
        assert_eq!(query.limit, 10);
    }
}

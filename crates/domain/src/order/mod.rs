//! Order aggregate and related types.

mod aggregate;
mod commands;
mod events;
mod queries;
mod state;
mod value_objects;

pub use aggregate::{Order, OrderParts};
pub use commands::*;
pub use events::{
    OrderCancelledData, OrderConfirmedData, OrderCreatedData, OrderDeliveredData, OrderEvent,
    OrderShippedData,
};
pub use queries::{GetOrderById, GetOrdersByStatus, ListOrders};
pub use state::{OrderStatus, ReturnStatus};
pub use value_objects::{
    ClientId, DeliveryDetails, Eta, Money, OrderItem, OrderTotals, SkuId, VendorId,
};

use thiserror::Error;

/// Errors that can occur during order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// SKU identifier was empty.
    #[error("sku id must not be empty")]
    EmptySku,

    /// Item quantity was zero.
    #[error("invalid quantity: {quantity} (must be greater than 0)")]
    InvalidQuantity { quantity: u32 },

    /// Item unit price was negative.
    #[error("invalid price: {cents} cents (must not be negative)")]
    NegativePrice { cents: i64 },

    /// An order must be created with at least one item.
    #[error("order must contain at least one item")]
    NoItems,

    /// The last remaining item cannot be removed.
    #[error("order must keep at least one item")]
    LastItem,

    /// Item not found in the order.
    #[error("item not found: {sku}")]
    ItemNotFound { sku: String },

    /// Items can only be edited while the order is placed.
    #[error("items are editable only while the order is placed (status is {status})")]
    ItemsLocked { status: OrderStatus },

    /// The order is not in the expected status for this transition.
    #[error("cannot {action} an order in {current} status")]
    InvalidStateTransition {
        current: OrderStatus,
        action: &'static str,
    },

    /// Shipped and delivered orders cannot be cancelled.
    #[error("cannot cancel shipped or delivered orders (status is {status})")]
    CancelForbidden { status: OrderStatus },

    /// Returns can only be requested for delivered orders.
    #[error("only delivered orders may be returned (status is {status})")]
    ReturnNotAllowed { status: OrderStatus },

    /// No return has been requested on this order.
    #[error("no pending return on this order")]
    NoPendingReturn,

    /// The requested target status cannot be reached through an update.
    #[error("orders cannot be moved to {status} through an update")]
    InvalidTargetStatus { status: OrderStatus },
}

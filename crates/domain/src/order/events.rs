//! Order domain events.
//!
//! Events are recorded by aggregate mutators into a transient buffer and
//! published by the application layer after the aggregate has been saved.

use chrono::{DateTime, Utc};
use common::OrderId;
use serde::{Deserialize, Serialize};

use super::{ClientId, Money, OrderStatus};

/// Events recorded by side-effect-bearing order transitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum OrderEvent {
    /// Order was created.
    OrderCreated(OrderCreatedData),

    /// Order was confirmed.
    OrderConfirmed(OrderConfirmedData),

    /// Order was cancelled.
    OrderCancelled(OrderCancelledData),

    /// Order left the warehouse.
    OrderShipped(OrderShippedData),

    /// Order reached the customer.
    OrderDelivered(OrderDeliveredData),
}

impl OrderEvent {
    /// Returns the event type name used to route the event to subscribers.
    pub fn event_type(&self) -> &'static str {
        match self {
            OrderEvent::OrderCreated(_) => "OrderCreated",
            OrderEvent::OrderConfirmed(_) => "OrderConfirmed",
            OrderEvent::OrderCancelled(_) => "OrderCancelled",
            OrderEvent::OrderShipped(_) => "OrderShipped",
            OrderEvent::OrderDelivered(_) => "OrderDelivered",
        }
    }

    /// Returns the ID of the order the event belongs to.
    pub fn order_id(&self) -> OrderId {
        match self {
            OrderEvent::OrderCreated(data) => data.order_id,
            OrderEvent::OrderConfirmed(data) => data.order_id,
            OrderEvent::OrderCancelled(data) => data.order_id,
            OrderEvent::OrderShipped(data) => data.order_id,
            OrderEvent::OrderDelivered(data) => data.order_id,
        }
    }
}

/// Data for the OrderCreated event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreatedData {
    /// The unique order ID.
    pub order_id: OrderId,

    /// The human-readable order number.
    pub order_number: String,

    /// The client who placed the order.
    pub client_id: ClientId,

    /// Grand total at creation time.
    pub grand_total: Money,

    /// When the order was created.
    pub created_at: DateTime<Utc>,
}

/// Data for the OrderConfirmed event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderConfirmedData {
    /// The confirmed order.
    pub order_id: OrderId,

    /// When the order was confirmed.
    pub confirmed_at: DateTime<Utc>,
}

/// Data for the OrderCancelled event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCancelledData {
    /// The cancelled order.
    pub order_id: OrderId,

    /// Status the order was in before cancellation.
    pub previous_status: OrderStatus,

    /// When the order was cancelled.
    pub cancelled_at: DateTime<Utc>,
}

/// Data for the OrderShipped event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderShippedData {
    /// The shipped order.
    pub order_id: OrderId,

    /// When the order was shipped.
    pub shipped_at: DateTime<Utc>,
}

/// Data for the OrderDelivered event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDeliveredData {
    /// The delivered order.
    pub order_id: OrderId,

    /// When the order was delivered.
    pub delivered_at: DateTime<Utc>,
}

// Convenience constructors for events
impl OrderEvent {
    /// Creates an OrderCreated event.
    pub fn order_created(
        order_id: OrderId,
        order_number: impl Into<String>,
        client_id: ClientId,
        grand_total: Money,
    ) -> Self {
        OrderEvent::OrderCreated(OrderCreatedData {
            order_id,
            order_number: order_number.into(),
            client_id,
            grand_total,
            created_at: Utc::now(),
        })
    }

    /// Creates an OrderConfirmed event.
    pub fn order_confirmed(order_id: OrderId) -> Self {
        OrderEvent::OrderConfirmed(OrderConfirmedData {
            order_id,
            confirmed_at: Utc::now(),
        })
    }

    /// Creates an OrderCancelled event.
    pub fn order_cancelled(order_id: OrderId, previous_status: OrderStatus) -> Self {
        OrderEvent::OrderCancelled(OrderCancelledData {
            order_id,
            previous_status,
            cancelled_at: Utc::now(),
        })
    }

    /// Creates an OrderShipped event.
    pub fn order_shipped(order_id: OrderId) -> Self {
        OrderEvent::OrderShipped(OrderShippedData {
            order_id,
            shipped_at: Utc::now(),
        })
    }

    /// Creates an OrderDelivered event.
    pub fn order_delivered(order_id: OrderId) -> Self {
        OrderEvent::OrderDelivered(OrderDeliveredData {
            order_id,
            delivered_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_type_names() {
        let order_id = OrderId::new();
        let client_id = ClientId::new();

        let event =
            OrderEvent::order_created(order_id, "ORD-1", client_id, Money::from_cents(2320));
        assert_eq!(event.event_type(), "OrderCreated");

        let event = OrderEvent::order_confirmed(order_id);
        assert_eq!(event.event_type(), "OrderConfirmed");

        let event = OrderEvent::order_cancelled(order_id, OrderStatus::Placed);
        assert_eq!(event.event_type(), "OrderCancelled");

        let event = OrderEvent::order_shipped(order_id);
        assert_eq!(event.event_type(), "OrderShipped");

        let event = OrderEvent::order_delivered(order_id);
        assert_eq!(event.event_type(), "OrderDelivered");
    }

    #[test]
    fn events_expose_their_order_id() {
        let order_id = OrderId::new();
        let event = OrderEvent::order_shipped(order_id);
        assert_eq!(event.order_id(), order_id);
    }

    #[test]
    fn event_serialization_roundtrip() {
        let order_id = OrderId::new();
        let client_id = ClientId::new();
        let event =
            OrderEvent::order_created(order_id, "ORD-42", client_id, Money::from_cents(1000));

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("OrderCreated"));

        let deserialized: OrderEvent = serde_json::from_str(&json).unwrap();
        if let OrderEvent::OrderCreated(data) = deserialized {
            assert_eq!(data.order_id, order_id);
            assert_eq!(data.order_number, "ORD-42");
            assert_eq!(data.grand_total.cents(), 1000);
        } else {
            panic!("Expected OrderCreated event");
        }
    }

    #[test]
    fn cancelled_event_keeps_previous_status() {
        let event = OrderEvent::order_cancelled(OrderId::new(), OrderStatus::Confirmed);
        let json = serde_json::to_string(&event).unwrap();
        let deserialized: OrderEvent = serde_json::from_str(&json).unwrap();

        if let OrderEvent::OrderCancelled(data) = deserialized {
            assert_eq!(data.previous_status, OrderStatus::Confirmed);
        } else {
            panic!("Expected OrderCancelled event");
        }
    }
}

//! Order status state machine.

use serde::{Deserialize, Serialize};

/// The status of an order in its lifecycle.
///
/// Status transitions:
/// ```text
/// Placed ──► Confirmed ──► Picked ──► Shipped ──► Delivered ──► Returned
///    │           │            │                        │     (via return
///    └───────────┴────────────┴──► Cancelled           │      workflow)
///                                      ▲───────────────┘  never: cancel is
///                                                          rejected once
///                                                          shipped/delivered
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    /// Order has been placed, items can still be added/removed.
    #[default]
    Placed,

    /// Order has been confirmed and is awaiting picking.
    Confirmed,

    /// Order was cancelled.
    Cancelled,

    /// Items have been picked from the warehouse.
    Picked,

    /// Order has left the warehouse.
    Shipped,

    /// Order reached the customer.
    Delivered,

    /// Order came back through the return workflow (terminal).
    Returned,
}

impl OrderStatus {
    /// Returns true if items can be added or removed in this status.
    pub fn can_modify_items(&self) -> bool {
        matches!(self, OrderStatus::Placed)
    }

    /// Returns true if the order can be cancelled in this status.
    ///
    /// Cancellation is rejected only once the order has physically left
    /// the warehouse.
    pub fn can_cancel(&self) -> bool {
        !matches!(self, OrderStatus::Shipped | OrderStatus::Delivered)
    }

    /// Returns true if a return can be requested in this status.
    pub fn can_request_return(&self) -> bool {
        matches!(self, OrderStatus::Delivered)
    }

    /// Returns true if no further lifecycle transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Returned)
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Placed => "PLACED",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::Cancelled => "CANCELLED",
            OrderStatus::Picked => "PICKED",
            OrderStatus::Shipped => "SHIPPED",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Returned => "RETURNED",
        }
    }

    /// Parses a stored status string, as written by `as_str`.
    pub fn parse_str(s: &str) -> Option<Self> {
        match s {
            "PLACED" => Some(OrderStatus::Placed),
            "CONFIRMED" => Some(OrderStatus::Confirmed),
            "CANCELLED" => Some(OrderStatus::Cancelled),
            "PICKED" => Some(OrderStatus::Picked),
            "SHIPPED" => Some(OrderStatus::Shipped),
            "DELIVERED" => Some(OrderStatus::Delivered),
            "RETURNED" => Some(OrderStatus::Returned),
            _ => None,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Progress of the return workflow, meaningful only once a return
/// has been requested on a delivered order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReturnStatus {
    /// Return requested, awaiting a decision.
    Pending,

    /// Return approved by the vendor.
    Approved,

    /// Return rejected by the vendor.
    Rejected,

    /// Goods received back, order moved to Returned.
    Completed,
}

impl ReturnStatus {
    /// Returns the return status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReturnStatus::Pending => "PENDING",
            ReturnStatus::Approved => "APPROVED",
            ReturnStatus::Rejected => "REJECTED",
            ReturnStatus::Completed => "COMPLETED",
        }
    }

    /// Parses a stored return status string, as written by `as_str`.
    pub fn parse_str(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(ReturnStatus::Pending),
            "APPROVED" => Some(ReturnStatus::Approved),
            "REJECTED" => Some(ReturnStatus::Rejected),
            "COMPLETED" => Some(ReturnStatus::Completed),
            _ => None,
        }
    }
}

impl std::fmt::Display for ReturnStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_status_is_placed() {
        assert_eq!(OrderStatus::default(), OrderStatus::Placed);
    }

    #[test]
    fn only_placed_can_modify_items() {
        assert!(OrderStatus::Placed.can_modify_items());
        assert!(!OrderStatus::Confirmed.can_modify_items());
        assert!(!OrderStatus::Cancelled.can_modify_items());
        assert!(!OrderStatus::Picked.can_modify_items());
        assert!(!OrderStatus::Shipped.can_modify_items());
        assert!(!OrderStatus::Delivered.can_modify_items());
        assert!(!OrderStatus::Returned.can_modify_items());
    }

    #[test]
    fn cancel_rejected_once_shipped_or_delivered() {
        assert!(OrderStatus::Placed.can_cancel());
        assert!(OrderStatus::Confirmed.can_cancel());
        assert!(OrderStatus::Picked.can_cancel());
        assert!(OrderStatus::Cancelled.can_cancel());
        assert!(OrderStatus::Returned.can_cancel());
        assert!(!OrderStatus::Shipped.can_cancel());
        assert!(!OrderStatus::Delivered.can_cancel());
    }

    #[test]
    fn only_delivered_can_request_return() {
        assert!(OrderStatus::Delivered.can_request_return());
        assert!(!OrderStatus::Placed.can_request_return());
        assert!(!OrderStatus::Shipped.can_request_return());
        assert!(!OrderStatus::Returned.can_request_return());
    }

    #[test]
    fn status_string_roundtrip() {
        for status in [
            OrderStatus::Placed,
            OrderStatus::Confirmed,
            OrderStatus::Cancelled,
            OrderStatus::Picked,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
            OrderStatus::Returned,
        ] {
            assert_eq!(OrderStatus::parse_str(status.as_str()), Some(status));
        }
        assert_eq!(OrderStatus::parse_str("UNKNOWN"), None);
    }

    #[test]
    fn return_status_string_roundtrip() {
        for status in [
            ReturnStatus::Pending,
            ReturnStatus::Approved,
            ReturnStatus::Rejected,
            ReturnStatus::Completed,
        ] {
            assert_eq!(ReturnStatus::parse_str(status.as_str()), Some(status));
        }
        assert_eq!(ReturnStatus::parse_str(""), None);
    }

    #[test]
    fn display_matches_as_str() {
        assert_eq!(OrderStatus::Delivered.to_string(), "DELIVERED");
        assert_eq!(ReturnStatus::Pending.to_string(), "PENDING");
    }

    #[test]
    fn serialization_roundtrip() {
        let status = OrderStatus::Picked;
        let json = serde_json::to_string(&status).unwrap();
        let deserialized: OrderStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(status, deserialized);
    }
}

//! Order commands.
//!
//! Plain intent carriers describing a requested state change. Each command
//! is handled by exactly one handler in the application layer.

use common::OrderId;

use super::{ClientId, DeliveryDetails, Eta, OrderItem, OrderStatus, SkuId, VendorId};

/// Command to create a new order.
#[derive(Debug, Clone)]
pub struct CreateOrder {
    /// The client placing the order.
    pub client_id: ClientId,

    /// The vendor expected to fulfill the order, if known.
    pub vendor_id: Option<VendorId>,

    /// The items to order; duplicate SKUs are merged.
    pub items: Vec<OrderItem>,

    /// Initial delivery metadata, if any.
    pub delivery: DeliveryDetails,

    /// Initial estimated arrival, if any.
    pub eta: Option<Eta>,
}

impl CreateOrder {
    /// Creates a new CreateOrder command.
    pub fn new(client_id: ClientId, items: Vec<OrderItem>) -> Self {
        Self {
            client_id,
            vendor_id: None,
            items,
            delivery: DeliveryDetails::default(),
            eta: None,
        }
    }

    /// Sets the fulfilling vendor.
    pub fn with_vendor(mut self, vendor_id: VendorId) -> Self {
        self.vendor_id = Some(vendor_id);
        self
    }

    /// Sets the initial delivery metadata.
    pub fn with_delivery(mut self, delivery: DeliveryDetails) -> Self {
        self.delivery = delivery;
        self
    }
}

/// Command to patch order fields and optionally dispatch a status transition.
///
/// This is the only command that maps an arbitrary target status to the
/// matching narrow mutator; all other transitions go through their dedicated
/// single-purpose command.
#[derive(Debug, Clone, Default)]
pub struct UpdateOrder {
    /// The order to update.
    pub order_id: OrderId,

    /// Delivery fields to patch; absent fields are left untouched.
    pub delivery: DeliveryDetails,

    /// New estimated arrival, if given.
    pub eta: Option<Eta>,

    /// Vendor to assign, if given.
    pub vendor_id: Option<VendorId>,

    /// Target status to transition to, if given.
    pub status: Option<OrderStatus>,
}

impl UpdateOrder {
    /// Creates an empty update for the given order.
    pub fn new(order_id: OrderId) -> Self {
        Self {
            order_id,
            ..Default::default()
        }
    }

    /// Sets the delivery patch.
    pub fn with_delivery(mut self, delivery: DeliveryDetails) -> Self {
        self.delivery = delivery;
        self
    }

    /// Sets the estimated arrival.
    pub fn with_eta(mut self, eta: Eta) -> Self {
        self.eta = Some(eta);
        self
    }

    /// Sets the vendor to assign.
    pub fn with_vendor(mut self, vendor_id: VendorId) -> Self {
        self.vendor_id = Some(vendor_id);
        self
    }

    /// Sets the target status.
    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }
}

/// Command to confirm a placed order.
#[derive(Debug, Clone)]
pub struct ConfirmOrder {
    /// The order to confirm.
    pub order_id: OrderId,
}

impl ConfirmOrder {
    /// Creates a new ConfirmOrder command.
    pub fn new(order_id: OrderId) -> Self {
        Self { order_id }
    }
}

/// Command to cancel an order.
#[derive(Debug, Clone)]
pub struct CancelOrder {
    /// The order to cancel.
    pub order_id: OrderId,
}

impl CancelOrder {
    /// Creates a new CancelOrder command.
    pub fn new(order_id: OrderId) -> Self {
        Self { order_id }
    }
}

/// Command to mark a confirmed order as picked.
#[derive(Debug, Clone)]
pub struct MarkOrderPicked {
    /// The order that was picked.
    pub order_id: OrderId,
}

impl MarkOrderPicked {
    /// Creates a new MarkOrderPicked command.
    pub fn new(order_id: OrderId) -> Self {
        Self { order_id }
    }
}

/// Command to mark a picked order as shipped.
#[derive(Debug, Clone)]
pub struct MarkOrderShipped {
    /// The order that was shipped.
    pub order_id: OrderId,
}

impl MarkOrderShipped {
    /// Creates a new MarkOrderShipped command.
    pub fn new(order_id: OrderId) -> Self {
        Self { order_id }
    }
}

/// Command to mark a shipped order as delivered.
#[derive(Debug, Clone)]
pub struct MarkOrderDelivered {
    /// The order that was delivered.
    pub order_id: OrderId,
}

impl MarkOrderDelivered {
    /// Creates a new MarkOrderDelivered command.
    pub fn new(order_id: OrderId) -> Self {
        Self { order_id }
    }
}

/// Command to record an inventory reservation on an order.
#[derive(Debug, Clone)]
pub struct AddReservation {
    /// The order holding the reservation.
    pub order_id: OrderId,

    /// Reservation reference from the inventory system.
    pub reservation_id: String,
}

impl AddReservation {
    /// Creates a new AddReservation command.
    pub fn new(order_id: OrderId, reservation_id: impl Into<String>) -> Self {
        Self {
            order_id,
            reservation_id: reservation_id.into(),
        }
    }
}

/// Command to release an inventory reservation from an order.
#[derive(Debug, Clone)]
pub struct RemoveReservation {
    /// The order holding the reservation.
    pub order_id: OrderId,

    /// Reservation reference to release.
    pub reservation_id: String,
}

impl RemoveReservation {
    /// Creates a new RemoveReservation command.
    pub fn new(order_id: OrderId, reservation_id: impl Into<String>) -> Self {
        Self {
            order_id,
            reservation_id: reservation_id.into(),
        }
    }
}

/// Command to request a return on a delivered order.
#[derive(Debug, Clone)]
pub struct RequestReturn {
    /// The order to return.
    pub order_id: OrderId,

    /// Reason for the return.
    pub reason: String,
}

impl RequestReturn {
    /// Creates a new RequestReturn command.
    pub fn new(order_id: OrderId, reason: impl Into<String>) -> Self {
        Self {
            order_id,
            reason: reason.into(),
        }
    }
}

/// Command to approve a requested return.
#[derive(Debug, Clone)]
pub struct ApproveReturn {
    /// The order with the pending return.
    pub order_id: OrderId,
}

impl ApproveReturn {
    /// Creates a new ApproveReturn command.
    pub fn new(order_id: OrderId) -> Self {
        Self { order_id }
    }
}

/// Command to reject a requested return.
#[derive(Debug, Clone)]
pub struct RejectReturn {
    /// The order with the pending return.
    pub order_id: OrderId,
}

impl RejectReturn {
    /// Creates a new RejectReturn command.
    pub fn new(order_id: OrderId) -> Self {
        Self { order_id }
    }
}

/// Command to complete a requested return.
#[derive(Debug, Clone)]
pub struct CompleteReturn {
    /// The order with the pending return.
    pub order_id: OrderId,
}

impl CompleteReturn {
    /// Creates a new CompleteReturn command.
    pub fn new(order_id: OrderId) -> Self {
        Self { order_id }
    }
}

/// Command to add an item to a placed order.
#[derive(Debug, Clone)]
pub struct AddOrderItem {
    /// The order to add the item to.
    pub order_id: OrderId,

    /// The item to add; merged by SKU if already present.
    pub item: OrderItem,
}

impl AddOrderItem {
    /// Creates a new AddOrderItem command.
    pub fn new(order_id: OrderId, item: OrderItem) -> Self {
        Self { order_id, item }
    }
}

/// Command to remove an item from a placed order.
#[derive(Debug, Clone)]
pub struct RemoveOrderItem {
    /// The order to remove the item from.
    pub order_id: OrderId,

    /// The SKU to remove.
    pub sku: SkuId,
}

impl RemoveOrderItem {
    /// Creates a new RemoveOrderItem command.
    pub fn new(order_id: OrderId, sku: impl Into<SkuId>) -> Self {
        Self {
            order_id,
            sku: sku.into(),
        }
    }
}

/// Command to delete an order.
#[derive(Debug, Clone)]
pub struct DeleteOrder {
    /// The order to delete.
    pub order_id: OrderId,
}

impl DeleteOrder {
    /// Creates a new DeleteOrder command.
    pub fn new(order_id: OrderId) -> Self {
        Self { order_id }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::Money;

    #[test]
    fn create_order_builder() {
        let client_id = ClientId::new();
        let vendor_id = VendorId::new();
        let items = vec![OrderItem::new("SKU001", 2, Money::from_cents(1000)).unwrap()];

        let cmd = CreateOrder::new(client_id, items).with_vendor(vendor_id);
        assert_eq!(cmd.client_id, client_id);
        assert_eq!(cmd.vendor_id, Some(vendor_id));
        assert_eq!(cmd.items.len(), 1);
        assert!(cmd.eta.is_none());
    }

    #[test]
    fn update_order_builder() {
        let order_id = OrderId::new();
        let cmd = UpdateOrder::new(order_id)
            .with_status(OrderStatus::Confirmed)
            .with_delivery(DeliveryDetails {
                address: Some("4 Clinic Way".to_string()),
                ..Default::default()
            });

        assert_eq!(cmd.order_id, order_id);
        assert_eq!(cmd.status, Some(OrderStatus::Confirmed));
        assert_eq!(cmd.delivery.address.as_deref(), Some("4 Clinic Way"));
    }

    #[test]
    fn reservation_commands_carry_reference() {
        let order_id = OrderId::new();
        let add = AddReservation::new(order_id, "RES-1");
        assert_eq!(add.reservation_id, "RES-1");

        let remove = RemoveReservation::new(order_id, "RES-1");
        assert_eq!(remove.reservation_id, "RES-1");
    }

    #[test]
    fn request_return_carries_reason() {
        let cmd = RequestReturn::new(OrderId::new(), "damaged");
        assert_eq!(cmd.reason, "damaged");
    }
}

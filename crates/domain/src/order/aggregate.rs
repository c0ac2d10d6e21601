//! Order aggregate implementation.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use common::OrderId;
use uuid::Uuid;

use super::{
    ClientId, DeliveryDetails, Eta, OrderError, OrderEvent, OrderItem, OrderStatus, OrderTotals,
    ReturnStatus, SkuId, VendorId,
};

/// Order aggregate root.
///
/// Holds identity, items, status and derived totals, and enforces the
/// lifecycle state machine. All mutation goes through the methods below;
/// side-effect-bearing transitions record a domain event into a transient
/// buffer that the application layer drains after a successful save.
#[derive(Debug, Clone)]
pub struct Order {
    id: OrderId,
    order_number: String,
    client_id: ClientId,
    vendor_id: Option<VendorId>,

    /// Optimistic-concurrency counter, bumped by the repository on save.
    version: u64,

    /// Never empty for the lifetime of the aggregate.
    items: Vec<OrderItem>,
    status: OrderStatus,

    /// Always consistent with `items`, recomputed on every item mutation.
    totals: OrderTotals,

    /// External inventory holds; order-insensitive, duplicate-safe.
    reservations: BTreeSet<String>,
    eta: Option<Eta>,
    delivery: DeliveryDetails,

    return_requested: bool,
    return_reason: Option<String>,
    return_status: Option<ReturnStatus>,

    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,

    /// Transient event buffer; not persisted.
    events: Vec<OrderEvent>,
}

/// All persisted fields of an order, used by repository adapters to
/// rehydrate an aggregate from storage.
///
/// Totals are not part of the rehydration input; they are recomputed from
/// the items so a stored total can never go stale.
#[derive(Debug, Clone)]
pub struct OrderParts {
    pub id: OrderId,
    pub order_number: String,
    pub client_id: ClientId,
    pub vendor_id: Option<VendorId>,
    pub version: u64,
    pub items: Vec<OrderItem>,
    pub status: OrderStatus,
    pub reservations: BTreeSet<String>,
    pub eta: Option<Eta>,
    pub delivery: DeliveryDetails,
    pub return_requested: bool,
    pub return_reason: Option<String>,
    pub return_status: Option<ReturnStatus>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Creation and rehydration
impl Order {
    /// Places a new order.
    ///
    /// Assigns a fresh ID and order number, merges duplicate-SKU items,
    /// starts in `Placed` status and records an `OrderCreated` event.
    pub fn place(
        client_id: ClientId,
        vendor_id: Option<VendorId>,
        items: Vec<OrderItem>,
    ) -> Result<Self, OrderError> {
        if items.is_empty() {
            return Err(OrderError::NoItems);
        }

        let mut merged: Vec<OrderItem> = Vec::with_capacity(items.len());
        for item in items {
            match merged.iter_mut().find(|existing| existing.sku == item.sku) {
                Some(existing) => existing.quantity += item.quantity,
                None => merged.push(item),
            }
        }

        let now = Utc::now();
        let id = OrderId::new();
        let order_number = generate_order_number(now);
        let totals = OrderTotals::from_items(&merged);

        let mut order = Self {
            id,
            order_number: order_number.clone(),
            client_id,
            vendor_id,
            version: 0,
            items: merged,
            status: OrderStatus::Placed,
            totals,
            reservations: BTreeSet::new(),
            eta: None,
            delivery: DeliveryDetails::default(),
            return_requested: false,
            return_reason: None,
            return_status: None,
            created_at: now,
            updated_at: now,
            events: Vec::new(),
        };

        order.record(OrderEvent::order_created(
            id,
            order_number,
            client_id,
            totals.grand_total,
        ));
        Ok(order)
    }

    /// Rehydrates an order from its persisted parts.
    ///
    /// Fails if the stored record violates the non-empty-items invariant.
    pub fn from_parts(parts: OrderParts) -> Result<Self, OrderError> {
        if parts.items.is_empty() {
            return Err(OrderError::NoItems);
        }
        let totals = OrderTotals::from_items(&parts.items);
        Ok(Self {
            id: parts.id,
            order_number: parts.order_number,
            client_id: parts.client_id,
            vendor_id: parts.vendor_id,
            version: parts.version,
            items: parts.items,
            status: parts.status,
            totals,
            reservations: parts.reservations,
            eta: parts.eta,
            delivery: parts.delivery,
            return_requested: parts.return_requested,
            return_reason: parts.return_reason,
            return_status: parts.return_status,
            created_at: parts.created_at,
            updated_at: parts.updated_at,
            events: Vec::new(),
        })
    }

    /// Returns the persisted fields of this order.
    pub fn to_parts(&self) -> OrderParts {
        OrderParts {
            id: self.id,
            order_number: self.order_number.clone(),
            client_id: self.client_id,
            vendor_id: self.vendor_id,
            version: self.version,
            items: self.items.clone(),
            status: self.status,
            reservations: self.reservations.clone(),
            eta: self.eta,
            delivery: self.delivery.clone(),
            return_requested: self.return_requested,
            return_reason: self.return_reason.clone(),
            return_status: self.return_status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

// Query methods
impl Order {
    /// Returns the order ID.
    pub fn id(&self) -> OrderId {
        self.id
    }

    /// Returns the human-readable order number.
    pub fn order_number(&self) -> &str {
        &self.order_number
    }

    /// Returns the client who placed the order.
    pub fn client_id(&self) -> ClientId {
        self.client_id
    }

    /// Returns the vendor fulfilling the order, if assigned.
    pub fn vendor_id(&self) -> Option<VendorId> {
        self.vendor_id
    }

    /// Returns the optimistic-concurrency version.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Returns the items in the order.
    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    /// Returns an item by SKU.
    pub fn find_item(&self, sku: &SkuId) -> Option<&OrderItem> {
        self.items.iter().find(|item| &item.sku == sku)
    }

    /// Returns the number of distinct items.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Returns the current status.
    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// Returns the derived totals.
    pub fn totals(&self) -> OrderTotals {
        self.totals
    }

    /// Returns the active reservation IDs.
    pub fn reservations(&self) -> &BTreeSet<String> {
        &self.reservations
    }

    /// Returns true if the given reservation is held.
    pub fn has_reservation(&self, reservation_id: &str) -> bool {
        self.reservations.contains(reservation_id)
    }

    /// Returns the estimated time of arrival, if set.
    pub fn eta(&self) -> Option<&Eta> {
        self.eta.as_ref()
    }

    /// Returns the delivery metadata.
    pub fn delivery(&self) -> &DeliveryDetails {
        &self.delivery
    }

    /// Returns true if a return has been requested.
    pub fn return_requested(&self) -> bool {
        self.return_requested
    }

    /// Returns the reason given for the return, if any.
    pub fn return_reason(&self) -> Option<&str> {
        self.return_reason.as_deref()
    }

    /// Returns the progress of the return workflow, if started.
    pub fn return_status(&self) -> Option<ReturnStatus> {
        self.return_status
    }

    /// Returns when the order was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns when the order was last mutated.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the recorded, not-yet-published events.
    pub fn pending_events(&self) -> &[OrderEvent] {
        &self.events
    }
}

// Mutators
impl Order {
    /// Adds an item, merging quantities when the SKU is already present.
    pub fn add_item(&mut self, item: OrderItem) -> Result<(), OrderError> {
        if !self.status.can_modify_items() {
            return Err(OrderError::ItemsLocked {
                status: self.status,
            });
        }

        match self.items.iter_mut().find(|existing| existing.sku == item.sku) {
            Some(existing) => existing.quantity += item.quantity,
            None => self.items.push(item),
        }
        self.recompute_totals();
        self.touch();
        Ok(())
    }

    /// Removes an item by SKU. The last remaining item cannot be removed.
    pub fn remove_item(&mut self, sku: &SkuId) -> Result<(), OrderError> {
        if !self.status.can_modify_items() {
            return Err(OrderError::ItemsLocked {
                status: self.status,
            });
        }

        let position = self
            .items
            .iter()
            .position(|item| &item.sku == sku)
            .ok_or_else(|| OrderError::ItemNotFound {
                sku: sku.to_string(),
            })?;

        if self.items.len() < 2 {
            return Err(OrderError::LastItem);
        }

        self.items.remove(position);
        self.recompute_totals();
        self.touch();
        Ok(())
    }

    /// Confirms a placed order.
    pub fn confirm(&mut self) -> Result<(), OrderError> {
        if self.status != OrderStatus::Placed {
            return Err(OrderError::InvalidStateTransition {
                current: self.status,
                action: "confirm",
            });
        }
        self.status = OrderStatus::Confirmed;
        self.touch();
        self.record(OrderEvent::order_confirmed(self.id));
        Ok(())
    }

    /// Cancels the order. Rejected once the order has shipped.
    pub fn cancel(&mut self) -> Result<(), OrderError> {
        if !self.status.can_cancel() {
            return Err(OrderError::CancelForbidden {
                status: self.status,
            });
        }
        let previous = self.status;
        self.status = OrderStatus::Cancelled;
        self.touch();
        self.record(OrderEvent::order_cancelled(self.id, previous));
        Ok(())
    }

    /// Marks a confirmed order as picked.
    pub fn mark_picked(&mut self) -> Result<(), OrderError> {
        if self.status != OrderStatus::Confirmed {
            return Err(OrderError::InvalidStateTransition {
                current: self.status,
                action: "pick",
            });
        }
        self.status = OrderStatus::Picked;
        self.touch();
        Ok(())
    }

    /// Marks a picked order as shipped.
    pub fn mark_shipped(&mut self) -> Result<(), OrderError> {
        if self.status != OrderStatus::Picked {
            return Err(OrderError::InvalidStateTransition {
                current: self.status,
                action: "ship",
            });
        }
        self.status = OrderStatus::Shipped;
        self.touch();
        self.record(OrderEvent::order_shipped(self.id));
        Ok(())
    }

    /// Marks a shipped order as delivered.
    pub fn mark_delivered(&mut self) -> Result<(), OrderError> {
        if self.status != OrderStatus::Shipped {
            return Err(OrderError::InvalidStateTransition {
                current: self.status,
                action: "deliver",
            });
        }
        self.status = OrderStatus::Delivered;
        self.touch();
        self.record(OrderEvent::order_delivered(self.id));
        Ok(())
    }

    /// Requests a return on a delivered order.
    ///
    /// Re-requesting resets the return status to pending.
    pub fn request_return(&mut self, reason: impl Into<String>) -> Result<(), OrderError> {
        if !self.status.can_request_return() {
            return Err(OrderError::ReturnNotAllowed {
                status: self.status,
            });
        }
        self.return_requested = true;
        self.return_reason = Some(reason.into());
        self.return_status = Some(ReturnStatus::Pending);
        self.touch();
        Ok(())
    }

    /// Approves a requested return.
    pub fn approve_return(&mut self) -> Result<(), OrderError> {
        if !self.return_requested {
            return Err(OrderError::NoPendingReturn);
        }
        self.return_status = Some(ReturnStatus::Approved);
        self.touch();
        Ok(())
    }

    /// Rejects a requested return.
    pub fn reject_return(&mut self) -> Result<(), OrderError> {
        if !self.return_requested {
            return Err(OrderError::NoPendingReturn);
        }
        self.return_status = Some(ReturnStatus::Rejected);
        self.touch();
        Ok(())
    }

    /// Completes a requested return and moves the order to `Returned`.
    pub fn complete_return(&mut self) -> Result<(), OrderError> {
        if !self.return_requested {
            return Err(OrderError::NoPendingReturn);
        }
        self.return_status = Some(ReturnStatus::Completed);
        self.status = OrderStatus::Returned;
        self.touch();
        Ok(())
    }

    /// Records an inventory reservation. Idempotent.
    pub fn add_reservation(&mut self, reservation_id: impl Into<String>) {
        self.reservations.insert(reservation_id.into());
        self.touch();
    }

    /// Releases an inventory reservation. Idempotent.
    pub fn remove_reservation(&mut self, reservation_id: &str) {
        self.reservations.remove(reservation_id);
        self.touch();
    }

    /// Replaces the estimated time of arrival.
    pub fn set_eta(&mut self, eta: Eta) {
        self.eta = Some(eta);
        self.touch();
    }

    /// Assigns the vendor fulfilling the order.
    pub fn assign_vendor(&mut self, vendor_id: VendorId) {
        self.vendor_id = Some(vendor_id);
        self.touch();
    }

    /// Applies the populated fields of a delivery patch.
    pub fn update_delivery(&mut self, patch: DeliveryDetails) {
        if patch.is_empty() {
            return;
        }
        self.delivery.merge(patch);
        self.touch();
    }

    /// Drains the recorded events, leaving the buffer empty.
    pub fn take_events(&mut self) -> Vec<OrderEvent> {
        std::mem::take(&mut self.events)
    }

    fn record(&mut self, event: OrderEvent) {
        self.events.push(event);
    }

    fn recompute_totals(&mut self) {
        self.totals = OrderTotals::from_items(&self.items);
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Generates a human-readable order number from a timestamp plus a random
/// suffix taken from a v4 UUID.
fn generate_order_number(now: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!(
        "ORD-{}-{}",
        now.format("%Y%m%d%H%M%S"),
        suffix[..6].to_uppercase()
    )
}

//! Order command and query handlers.
//!
//! Every command follows the same shape: load the aggregate, run the
//! mutator, save through the repository, then publish the drained events.
//! The save commits before any event is delivered, so a subscriber failure
//! never rolls back a state change.

use std::sync::Arc;

use common::OrderId;
use domain::{
    AddOrderItem, AddReservation, ApproveReturn, CancelOrder, CompleteReturn, ConfirmOrder,
    CreateOrder, DeleteOrder, GetOrderById, GetOrdersByStatus, ListOrders, MarkOrderDelivered,
    MarkOrderPicked, MarkOrderShipped, Order, OrderError, OrderStatus, RejectReturn,
    RemoveOrderItem, RemoveReservation, RequestReturn, UpdateOrder,
};
use order_store::OrderRepository;

use crate::{AppError, DomainEventBus, ProductValidator, Result};

/// Application service for the order lifecycle.
pub struct OrderService<R: OrderRepository> {
    repository: R,
    bus: Arc<DomainEventBus>,
    products: Arc<dyn ProductValidator>,
}

impl<R: OrderRepository> OrderService<R> {
    /// Creates a new order service.
    pub fn new(
        repository: R,
        bus: Arc<DomainEventBus>,
        products: Arc<dyn ProductValidator>,
    ) -> Self {
        Self {
            repository,
            bus,
            products,
        }
    }

    /// Saves the order, then drains and publishes its recorded events.
    async fn save_and_publish(&self, mut order: Order) -> Result<Order> {
        let events = order.take_events();
        let saved = self.repository.save(&order).await?;
        for event in &events {
            self.bus.publish(event).await?;
        }
        Ok(saved)
    }

    /// Loads the order, applies the mutation, saves and publishes.
    async fn execute<F>(&self, order_id: OrderId, mutate: F) -> Result<Order>
    where
        F: FnOnce(&mut Order) -> std::result::Result<(), OrderError>,
    {
        let mut order = self
            .repository
            .find_by_id(order_id)
            .await?
            .ok_or(AppError::OrderNotFound(order_id))?;

        mutate(&mut order)?;
        self.save_and_publish(order).await
    }

    /// Creates a new order after validating every SKU against the catalog.
    ///
    /// Validation runs before the aggregate is built; a rejected SKU means
    /// nothing is persisted and no event is published.
    #[tracing::instrument(skip(self, cmd), fields(client_id = %cmd.client_id))]
    pub async fn create_order(&self, cmd: CreateOrder) -> Result<Order> {
        let skus: Vec<_> = cmd.items.iter().map(|item| item.sku.clone()).collect();
        self.products.validate_skus(&skus).await?;

        let mut order = Order::place(cmd.client_id, cmd.vendor_id, cmd.items)?;
        if !cmd.delivery.is_empty() {
            order.update_delivery(cmd.delivery);
        }
        if let Some(eta) = cmd.eta {
            order.set_eta(eta);
        }

        let saved = self.save_and_publish(order).await?;
        metrics::counter!("orders_created_total").increment(1);
        tracing::info!(order_id = %saved.id(), order_number = saved.order_number(), "order created");
        Ok(saved)
    }

    /// Patches delivery fields and ETA, then dispatches an optional status
    /// transition to the matching mutator.
    #[tracing::instrument(skip(self, cmd), fields(order_id = %cmd.order_id))]
    pub async fn update_order(&self, cmd: UpdateOrder) -> Result<Order> {
        self.execute(cmd.order_id, |order| {
            if !cmd.delivery.is_empty() {
                order.update_delivery(cmd.delivery);
            }
            if let Some(eta) = cmd.eta {
                order.set_eta(eta);
            }
            if let Some(vendor_id) = cmd.vendor_id {
                order.assign_vendor(vendor_id);
            }
            match cmd.status {
                None => Ok(()),
                Some(OrderStatus::Confirmed) => order.confirm(),
                Some(OrderStatus::Cancelled) => order.cancel(),
                Some(OrderStatus::Picked) => order.mark_picked(),
                Some(OrderStatus::Shipped) => order.mark_shipped(),
                Some(OrderStatus::Delivered) => order.mark_delivered(),
                Some(status @ (OrderStatus::Placed | OrderStatus::Returned)) => {
                    Err(OrderError::InvalidTargetStatus { status })
                }
            }
        })
        .await
    }

    /// Confirms a placed order.
    #[tracing::instrument(skip(self), fields(order_id = %cmd.order_id))]
    pub async fn confirm_order(&self, cmd: ConfirmOrder) -> Result<Order> {
        self.execute(cmd.order_id, Order::confirm).await
    }

    /// Cancels an order that has not yet shipped.
    #[tracing::instrument(skip(self), fields(order_id = %cmd.order_id))]
    pub async fn cancel_order(&self, cmd: CancelOrder) -> Result<Order> {
        self.execute(cmd.order_id, Order::cancel).await
    }

    /// Marks a confirmed order as picked.
    #[tracing::instrument(skip(self), fields(order_id = %cmd.order_id))]
    pub async fn mark_order_picked(&self, cmd: MarkOrderPicked) -> Result<Order> {
        self.execute(cmd.order_id, Order::mark_picked).await
    }

    /// Marks a picked order as shipped.
    #[tracing::instrument(skip(self), fields(order_id = %cmd.order_id))]
    pub async fn mark_order_shipped(&self, cmd: MarkOrderShipped) -> Result<Order> {
        self.execute(cmd.order_id, Order::mark_shipped).await
    }

    /// Marks a shipped order as delivered.
    #[tracing::instrument(skip(self), fields(order_id = %cmd.order_id))]
    pub async fn mark_order_delivered(&self, cmd: MarkOrderDelivered) -> Result<Order> {
        self.execute(cmd.order_id, Order::mark_delivered).await
    }

    /// Adds an item to a placed order, merging by SKU.
    #[tracing::instrument(skip(self, cmd), fields(order_id = %cmd.order_id))]
    pub async fn add_order_item(&self, cmd: AddOrderItem) -> Result<Order> {
        let skus = vec![cmd.item.sku.clone()];
        self.products.validate_skus(&skus).await?;
        self.execute(cmd.order_id, |order| order.add_item(cmd.item))
            .await
    }

    /// Removes an item from a placed order.
    #[tracing::instrument(skip(self, cmd), fields(order_id = %cmd.order_id))]
    pub async fn remove_order_item(&self, cmd: RemoveOrderItem) -> Result<Order> {
        self.execute(cmd.order_id, |order| order.remove_item(&cmd.sku))
            .await
    }

    /// Records an inventory reservation reference on an order.
    #[tracing::instrument(skip(self, cmd), fields(order_id = %cmd.order_id))]
    pub async fn add_reservation(&self, cmd: AddReservation) -> Result<Order> {
        self.execute(cmd.order_id, |order| {
            order.add_reservation(cmd.reservation_id);
            Ok(())
        })
        .await
    }

    /// Releases an inventory reservation reference from an order.
    #[tracing::instrument(skip(self, cmd), fields(order_id = %cmd.order_id))]
    pub async fn remove_reservation(&self, cmd: RemoveReservation) -> Result<Order> {
        self.execute(cmd.order_id, |order| {
            order.remove_reservation(&cmd.reservation_id);
            Ok(())
        })
        .await
    }

    /// Requests a return on a delivered order.
    #[tracing::instrument(skip(self, cmd), fields(order_id = %cmd.order_id))]
    pub async fn request_return(&self, cmd: RequestReturn) -> Result<Order> {
        self.execute(cmd.order_id, |order| order.request_return(cmd.reason))
            .await
    }

    /// Approves a pending return.
    #[tracing::instrument(skip(self), fields(order_id = %cmd.order_id))]
    pub async fn approve_return(&self, cmd: ApproveReturn) -> Result<Order> {
        self.execute(cmd.order_id, Order::approve_return).await
    }

    /// Rejects a pending return.
    #[tracing::instrument(skip(self), fields(order_id = %cmd.order_id))]
    pub async fn reject_return(&self, cmd: RejectReturn) -> Result<Order> {
        self.execute(cmd.order_id, Order::reject_return).await
    }

    /// Completes an approved return, moving the order to its terminal state.
    #[tracing::instrument(skip(self), fields(order_id = %cmd.order_id))]
    pub async fn complete_return(&self, cmd: CompleteReturn) -> Result<Order> {
        self.execute(cmd.order_id, Order::complete_return).await
    }

    /// Deletes an order. Fails if the order does not exist.
    #[tracing::instrument(skip(self), fields(order_id = %cmd.order_id))]
    pub async fn delete_order(&self, cmd: DeleteOrder) -> Result<()> {
        if !self.repository.delete(cmd.order_id).await? {
            return Err(AppError::OrderNotFound(cmd.order_id));
        }
        tracing::info!(order_id = %cmd.order_id, "order deleted");
        Ok(())
    }

    /// Fetches a single order. Not-found is an error, not an empty result.
    #[tracing::instrument(skip(self), fields(order_id = %query.order_id))]
    pub async fn get_order(&self, query: GetOrderById) -> Result<Order> {
        self.repository
            .find_by_id(query.order_id)
            .await?
            .ok_or(AppError::OrderNotFound(query.order_id))
    }

    /// Lists orders in a given status, paginated, oldest first.
    #[tracing::instrument(skip(self))]
    pub async fn orders_by_status(&self, query: GetOrdersByStatus) -> Result<Vec<Order>> {
        let orders = self
            .repository
            .find_all(query.skip, query.limit, Some(query.status))
            .await?;
        Ok(orders)
    }

    /// Lists orders with an optional status filter, paginated, oldest first.
    #[tracing::instrument(skip(self))]
    pub async fn list_orders(&self, query: ListOrders) -> Result<Vec<Order>> {
        let orders = self
            .repository
            .find_all(query.skip, query.limit, query.status)
            .await?;
        Ok(orders)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryProductCatalog;
    use domain::{ClientId, DeliveryDetails, Money, OrderItem, VendorId};
    use order_store::InMemoryOrderRepository;

    fn service() -> OrderService<InMemoryOrderRepository> {
        let catalog = InMemoryProductCatalog::new();
        catalog.register_sku("SKU001");
        catalog.register_sku("SKU002");
        OrderService::new(
            InMemoryOrderRepository::new(),
            Arc::new(DomainEventBus::new()),
            Arc::new(catalog),
        )
    }

    fn items() -> Vec<OrderItem> {
        vec![OrderItem::new("SKU001", 2, Money::from_cents(1000)).unwrap()]
    }

    #[tokio::test]
    async fn create_order_persists_and_returns_saved_state() {
        let service = service();
        let order = service
            .create_order(CreateOrder::new(ClientId::new(), items()))
            .await
            .unwrap();

        assert_eq!(order.status(), OrderStatus::Placed);
        assert_eq!(order.version(), 1);
        assert_eq!(order.totals().grand_total, Money::from_cents(2320));

        let loaded = service.get_order(GetOrderById::new(order.id())).await.unwrap();
        assert_eq!(loaded.id(), order.id());
    }

    #[tokio::test]
    async fn create_order_rejects_unknown_sku_before_persisting() {
        let service = service();
        let bad_items = vec![OrderItem::new("SKU999", 1, Money::from_cents(100)).unwrap()];

        let result = service
            .create_order(CreateOrder::new(ClientId::new(), bad_items))
            .await;
        assert!(matches!(result, Err(AppError::ProductValidation(_))));

        let all = service.list_orders(ListOrders::new()).await.unwrap();
        assert!(all.is_empty());
    }

    #[tokio::test]
    async fn update_order_patches_delivery_and_transitions() {
        let service = service();
        let order = service
            .create_order(CreateOrder::new(ClientId::new(), items()))
            .await
            .unwrap();

        let vendor_id = VendorId::new();
        let updated = service
            .update_order(
                UpdateOrder::new(order.id())
                    .with_delivery(DeliveryDetails {
                        address: Some("4 Clinic Way".to_string()),
                        ..Default::default()
                    })
                    .with_vendor(vendor_id)
                    .with_status(OrderStatus::Confirmed),
            )
            .await
            .unwrap();

        assert_eq!(updated.status(), OrderStatus::Confirmed);
        assert_eq!(updated.delivery().address.as_deref(), Some("4 Clinic Way"));
        assert_eq!(updated.vendor_id(), Some(vendor_id));
    }

    #[tokio::test]
    async fn update_order_rejects_placed_and_returned_targets() {
        let service = service();
        let order = service
            .create_order(CreateOrder::new(ClientId::new(), items()))
            .await
            .unwrap();

        for status in [OrderStatus::Placed, OrderStatus::Returned] {
            let result = service
                .update_order(UpdateOrder::new(order.id()).with_status(status))
                .await;
            assert!(matches!(
                result,
                Err(AppError::Order(OrderError::InvalidTargetStatus { .. }))
            ));
        }
    }

    #[tokio::test]
    async fn lifecycle_commands_walk_the_state_machine() {
        let service = service();
        let order = service
            .create_order(CreateOrder::new(ClientId::new(), items()))
            .await
            .unwrap();
        let id = order.id();

        let order = service.confirm_order(ConfirmOrder::new(id)).await.unwrap();
        assert_eq!(order.status(), OrderStatus::Confirmed);

        let order = service
            .mark_order_picked(MarkOrderPicked::new(id))
            .await
            .unwrap();
        assert_eq!(order.status(), OrderStatus::Picked);

        let order = service
            .mark_order_shipped(MarkOrderShipped::new(id))
            .await
            .unwrap();
        assert_eq!(order.status(), OrderStatus::Shipped);

        let order = service
            .mark_order_delivered(MarkOrderDelivered::new(id))
            .await
            .unwrap();
        assert_eq!(order.status(), OrderStatus::Delivered);
        assert_eq!(order.version(), 5);
    }

    #[tokio::test]
    async fn skipping_a_step_is_rejected() {
        let service = service();
        let order = service
            .create_order(CreateOrder::new(ClientId::new(), items()))
            .await
            .unwrap();

        let result = service
            .mark_order_shipped(MarkOrderShipped::new(order.id()))
            .await;
        assert!(matches!(
            result,
            Err(AppError::Order(OrderError::InvalidStateTransition { .. }))
        ));
    }

    #[tokio::test]
    async fn commands_against_missing_order_fail_with_not_found() {
        let service = service();
        let id = OrderId::new();

        assert!(matches!(
            service.confirm_order(ConfirmOrder::new(id)).await,
            Err(AppError::OrderNotFound(_))
        ));
        assert!(matches!(
            service.get_order(GetOrderById::new(id)).await,
            Err(AppError::OrderNotFound(_))
        ));
        assert!(matches!(
            service.delete_order(DeleteOrder::new(id)).await,
            Err(AppError::OrderNotFound(_))
        ));
    }

    #[tokio::test]
    async fn reservations_are_recorded_and_released() {
        let service = service();
        let order = service
            .create_order(CreateOrder::new(ClientId::new(), items()))
            .await
            .unwrap();

        let order = service
            .add_reservation(AddReservation::new(order.id(), "RES-1"))
            .await
            .unwrap();
        assert!(order.has_reservation("RES-1"));

        let order = service
            .remove_reservation(RemoveReservation::new(order.id(), "RES-1"))
            .await
            .unwrap();
        assert!(!order.has_reservation("RES-1"));
    }

    #[tokio::test]
    async fn item_commands_modify_placed_orders_only() {
        let service = service();
        let order = service
            .create_order(CreateOrder::new(ClientId::new(), items()))
            .await
            .unwrap();

        let order = service
            .add_order_item(AddOrderItem::new(
                order.id(),
                OrderItem::new("SKU002", 1, Money::from_cents(500)).unwrap(),
            ))
            .await
            .unwrap();
        assert_eq!(order.item_count(), 2);

        let order = service.confirm_order(ConfirmOrder::new(order.id())).await.unwrap();
        let result = service
            .remove_order_item(RemoveOrderItem::new(order.id(), "SKU002"))
            .await;
        assert!(matches!(
            result,
            Err(AppError::Order(OrderError::ItemsLocked { .. }))
        ));
    }

    #[tokio::test]
    async fn queries_filter_and_paginate() {
        let service = service();
        for _ in 0..3 {
            service
                .create_order(CreateOrder::new(ClientId::new(), items()))
                .await
                .unwrap();
        }
        let confirmed = service
            .create_order(CreateOrder::new(ClientId::new(), items()))
            .await
            .unwrap();
        service
            .confirm_order(ConfirmOrder::new(confirmed.id()))
            .await
            .unwrap();

        let placed = service
            .orders_by_status(GetOrdersByStatus::new(OrderStatus::Placed))
            .await
            .unwrap();
        assert_eq!(placed.len(), 3);

        let page = service
            .list_orders(ListOrders::new().paginate(0, 2))
            .await
            .unwrap();
        assert_eq!(page.len(), 2);

        let confirmed_only = service
            .list_orders(ListOrders::new().with_status(OrderStatus::Confirmed))
            .await
            .unwrap();
        assert_eq!(confirmed_only.len(), 1);
        assert_eq!(confirmed_only[0].id(), confirmed.id());
    }
}

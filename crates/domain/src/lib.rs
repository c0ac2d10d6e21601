//! Domain layer for the medical-supply order backend.
//!
//! This crate provides the order lifecycle core:
//! - Order aggregate with its status state machine and derived totals
//! - Self-validating value objects (OrderItem, Eta, Money)
//! - Domain events recorded by mutators and drained by handlers
//! - Command and query intent objects consumed by the application layer

pub mod order;

pub use order::{
    AddOrderItem, AddReservation, ApproveReturn, CancelOrder, ClientId, CompleteReturn,
    ConfirmOrder, CreateOrder, DeleteOrder, DeliveryDetails, Eta, GetOrderById, GetOrdersByStatus,
    ListOrders, MarkOrderDelivered, MarkOrderPicked, MarkOrderShipped, Money, Order, OrderError,
    OrderEvent, OrderItem, OrderParts, OrderStatus, OrderTotals, RejectReturn, RemoveOrderItem,
    RemoveReservation, RequestReturn, ReturnStatus, SkuId, UpdateOrder, VendorId,
};

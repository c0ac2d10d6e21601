//! Application layer for the medical-supply order backend.
//!
//! Wires the order domain to its ports: command and query handlers in
//! [`OrderService`], the persistence port from the order-store crate, the
//! [`ProductValidator`] collaborator, and the in-process [`DomainEventBus`].

pub mod bus;
pub mod error;
pub mod orders;
pub mod product;

pub use bus::{DomainEventBus, EventSubscriber};
pub use error::{AppError, Result};
pub use orders::OrderService;
pub use product::{InMemoryProductCatalog, ProductValidationError, ProductValidator};

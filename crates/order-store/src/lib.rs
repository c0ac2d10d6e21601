//! Persistence layer for the order backend.
//!
//! Defines the [`OrderRepository`] port the application layer depends on,
//! the persisted record shape, and two adapters: an in-memory store for
//! tests and a PostgreSQL store for production.

mod error;
mod memory;
mod postgres;
mod record;
mod repository;

pub use error::{Result, StoreError};
pub use memory::InMemoryOrderRepository;
pub use postgres::PostgresOrderRepository;
pub use record::{EtaRecord, ItemRecord, OrderRecord};
pub use repository::OrderRepository;

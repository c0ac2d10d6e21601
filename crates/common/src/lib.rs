//! Shared types used across the order backend crates.

mod types;

pub use types::OrderId;

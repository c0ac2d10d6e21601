//! Persisted shape of an order.
//!
//! The record is the storage contract: scalar fields map to columns in the
//! PostgreSQL adapter, while items, reservations and ETA are stored as JSON
//! documents. Both adapters share this mapping so an order reconstructed
//! after a save is identical regardless of backend.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use common::OrderId;
use domain::{
    ClientId, DeliveryDetails, Eta, Money, Order, OrderItem, OrderParts, OrderStatus, ReturnStatus,
    VendorId,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Result, StoreError};

/// One stored order item: `{sku_id, qty, price}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub sku_id: String,
    pub qty: u32,
    /// Unit price in cents.
    pub price: i64,
}

/// Stored estimated arrival: `{date, window_minutes}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EtaRecord {
    pub date: NaiveDate,
    pub window_minutes: u32,
}

/// A persisted order row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: Uuid,
    pub order_number: String,
    pub client_id: Uuid,
    pub vendor_id: Option<Uuid>,
    pub version: u64,
    pub items: Vec<ItemRecord>,
    pub status: String,
    /// Grand total in cents; derived, stored for external readers only.
    pub total: i64,
    pub reservations: Vec<String>,
    pub eta: Option<EtaRecord>,
    pub delivery_address: Option<String>,
    pub delivery_date: Option<NaiveDate>,
    pub contact_name: Option<String>,
    pub contact_phone: Option<String>,
    pub notes: Option<String>,
    pub route_id: Option<String>,
    pub return_requested: bool,
    pub return_reason: Option<String>,
    pub return_status: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderRecord {
    /// Builds the record to store for an aggregate, at the given version.
    pub fn from_order(order: &Order, version: u64) -> Self {
        Self {
            id: order.id().as_uuid(),
            order_number: order.order_number().to_string(),
            client_id: order.client_id().as_uuid(),
            vendor_id: order.vendor_id().map(|v| v.as_uuid()),
            version,
            items: order
                .items()
                .iter()
                .map(|item| ItemRecord {
                    sku_id: item.sku.to_string(),
                    qty: item.quantity,
                    price: item.unit_price.cents(),
                })
                .collect(),
            status: order.status().as_str().to_string(),
            total: order.totals().grand_total.cents(),
            reservations: order.reservations().iter().cloned().collect(),
            eta: order.eta().map(|eta| EtaRecord {
                date: eta.date,
                window_minutes: eta.window_minutes,
            }),
            delivery_address: order.delivery().address.clone(),
            delivery_date: order.delivery().date,
            contact_name: order.delivery().contact_name.clone(),
            contact_phone: order.delivery().contact_phone.clone(),
            notes: order.delivery().notes.clone(),
            route_id: order.delivery().route_id.clone(),
            return_requested: order.return_requested(),
            return_reason: order.return_reason().map(str::to_string),
            return_status: order.return_status().map(|s| s.as_str().to_string()),
            created_at: order.created_at(),
            updated_at: order.updated_at(),
        }
    }

    /// Reconstructs the aggregate from this record.
    ///
    /// Totals are recomputed from the stored items; the stored `total`
    /// column is never trusted.
    pub fn into_order(self) -> Result<Order> {
        let order_id = OrderId::from_uuid(self.id);

        let status = OrderStatus::parse_str(&self.status).ok_or_else(|| {
            StoreError::InvalidRecord {
                order_id,
                message: format!("unknown status {:?}", self.status),
            }
        })?;

        let return_status = match self.return_status {
            Some(ref s) => {
                Some(
                    ReturnStatus::parse_str(s).ok_or_else(|| StoreError::InvalidRecord {
                        order_id,
                        message: format!("unknown return status {s:?}"),
                    })?,
                )
            }
            None => None,
        };

        let items = self
            .items
            .into_iter()
            .map(|item| {
                OrderItem::new(item.sku_id, item.qty, Money::from_cents(item.price)).map_err(
                    |e| StoreError::InvalidRecord {
                        order_id,
                        message: e.to_string(),
                    },
                )
            })
            .collect::<Result<Vec<_>>>()?;

        let parts = OrderParts {
            id: order_id,
            order_number: self.order_number,
            client_id: ClientId::from_uuid(self.client_id),
            vendor_id: self.vendor_id.map(VendorId::from_uuid),
            version: self.version,
            items,
            status,
            reservations: self.reservations.into_iter().collect::<BTreeSet<_>>(),
            eta: self.eta.map(|eta| Eta::new(eta.date, eta.window_minutes)),
            delivery: DeliveryDetails {
                address: self.delivery_address,
                date: self.delivery_date,
                contact_name: self.contact_name,
                contact_phone: self.contact_phone,
                notes: self.notes,
                route_id: self.route_id,
            },
            return_requested: self.return_requested,
            return_reason: self.return_reason,
            return_status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        };

        Order::from_parts(parts).map_err(|e| StoreError::InvalidRecord {
            order_id,
            message: e.to_string(),
        })
    }
}

use async_trait::async_trait;
use common::OrderId;
use domain::{Order, OrderStatus};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{EtaRecord, ItemRecord, OrderRecord, OrderRepository, Result, StoreError};

/// PostgreSQL-backed order repository.
///
/// Scalar fields live in columns; items, reservations and ETA are JSONB.
#[derive(Clone)]
pub struct PostgresOrderRepository {
    pool: PgPool,
}

impl PostgresOrderRepository {
    /// Creates a new PostgreSQL order repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_record(row: PgRow) -> Result<OrderRecord> {
        let items_json: serde_json::Value = row.try_get("items")?;
        let items: Vec<ItemRecord> = serde_json::from_value(items_json)?;

        let reservations_json: serde_json::Value = row.try_get("reservations")?;
        let reservations: Vec<String> = serde_json::from_value(reservations_json)?;

        let eta_json: Option<serde_json::Value> = row.try_get("eta")?;
        let eta: Option<EtaRecord> = match eta_json {
            Some(value) => Some(serde_json::from_value(value)?),
            None => None,
        };

        Ok(OrderRecord {
            id: row.try_get::<Uuid, _>("id")?,
            order_number: row.try_get("order_number")?,
            client_id: row.try_get::<Uuid, _>("client_id")?,
            vendor_id: row.try_get::<Option<Uuid>, _>("vendor_id")?,
            version: row.try_get::<i64, _>("version")? as u64,
            items,
            status: row.try_get("status")?,
            total: row.try_get("total")?,
            reservations,
            eta,
            delivery_address: row.try_get("delivery_address")?,
            delivery_date: row.try_get("delivery_date")?,
            contact_name: row.try_get("contact_name")?,
            contact_phone: row.try_get("contact_phone")?,
            notes: row.try_get("notes")?,
            route_id: row.try_get("route_id")?,
            return_requested: row.try_get("return_requested")?,
            return_reason: row.try_get("return_reason")?,
            return_status: row.try_get("return_status")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    async fn fetch_record(&self, id: Uuid) -> Result<Option<OrderRecord>> {
        let row = sqlx::query(
            r#"
            SELECT id, order_number, client_id, vendor_id, version, items, status, total,
                   reservations, eta, delivery_address, delivery_date, contact_name,
                   contact_phone, notes, route_id, return_requested, return_reason,
                   return_status, created_at, updated_at
            FROM orders
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_record).transpose()
    }
}

#[async_trait]
impl OrderRepository for PostgresOrderRepository {
    #[tracing::instrument(skip(self, order), fields(order_id = %order.id()))]
    async fn save(&self, order: &Order) -> Result<Order> {
        let id = order.id().as_uuid();
        let expected = order.version();
        let record = OrderRecord::from_order(order, expected + 1);

        let items_json = serde_json::to_value(&record.items)?;
        let reservations_json = serde_json::to_value(&record.reservations)?;
        let eta_json = record.eta.as_ref().map(serde_json::to_value).transpose()?;

        let mut tx = self.pool.begin().await?;

        let actual: Option<i64> =
            sqlx::query_scalar("SELECT version FROM orders WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        match actual {
            None => {
                if expected != 0 {
                    return Err(StoreError::ConcurrencyConflict {
                        order_id: order.id(),
                        expected,
                        actual: 0,
                    });
                }
                sqlx::query(
                    r#"
                    INSERT INTO orders (
                        id, order_number, client_id, vendor_id, version, items, status,
                        total, reservations, eta, delivery_address, delivery_date,
                        contact_name, contact_phone, notes, route_id, return_requested,
                        return_reason, return_status, created_at, updated_at
                    )
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13,
                            $14, $15, $16, $17, $18, $19, $20, $21)
                    "#,
                )
                .bind(record.id)
                .bind(&record.order_number)
                .bind(record.client_id)
                .bind(record.vendor_id)
                .bind(record.version as i64)
                .bind(&items_json)
                .bind(&record.status)
                .bind(record.total)
                .bind(&reservations_json)
                .bind(&eta_json)
                .bind(&record.delivery_address)
                .bind(record.delivery_date)
                .bind(&record.contact_name)
                .bind(&record.contact_phone)
                .bind(&record.notes)
                .bind(&record.route_id)
                .bind(record.return_requested)
                .bind(&record.return_reason)
                .bind(&record.return_status)
                .bind(record.created_at)
                .bind(record.updated_at)
                .execute(&mut *tx)
                .await?;
            }
            Some(stored) => {
                if stored as u64 != expected {
                    return Err(StoreError::ConcurrencyConflict {
                        order_id: order.id(),
                        expected,
                        actual: stored as u64,
                    });
                }
                sqlx::query(
                    r#"
                    UPDATE orders SET
                        vendor_id = $2, version = $3, items = $4, status = $5, total = $6,
                        reservations = $7, eta = $8, delivery_address = $9,
                        delivery_date = $10, contact_name = $11, contact_phone = $12,
                        notes = $13, route_id = $14, return_requested = $15,
                        return_reason = $16, return_status = $17, updated_at = $18
                    WHERE id = $1
                    "#,
                )
                .bind(record.id)
                .bind(record.vendor_id)
                .bind(record.version as i64)
                .bind(&items_json)
                .bind(&record.status)
                .bind(record.total)
                .bind(&reservations_json)
                .bind(&eta_json)
                .bind(&record.delivery_address)
                .bind(record.delivery_date)
                .bind(&record.contact_name)
                .bind(&record.contact_phone)
                .bind(&record.notes)
                .bind(&record.route_id)
                .bind(record.return_requested)
                .bind(&record.return_reason)
                .bind(&record.return_status)
                .bind(record.updated_at)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;

        // Read-after-write: reconstruct from the stored row so the caller
        // never observes a value that diverges from durable state.
        let stored = self
            .fetch_record(id)
            .await?
            .ok_or_else(|| StoreError::InvalidRecord {
                order_id: order.id(),
                message: "row missing immediately after save".to_string(),
            })?;

        tracing::debug!(order_id = %order.id(), version = stored.version, "order saved");
        stored.into_order()
    }

    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>> {
        match self.fetch_record(id.as_uuid()).await? {
            Some(record) => Ok(Some(record.into_order()?)),
            None => Ok(None),
        }
    }

    async fn find_by_status(&self, status: OrderStatus) -> Result<Vec<Order>> {
        let rows = sqlx::query(
            r#"
            SELECT id, order_number, client_id, vendor_id, version, items, status, total,
                   reservations, eta, delivery_address, delivery_date, contact_name,
                   contact_phone, notes, route_id, return_requested, return_reason,
                   return_status, created_at, updated_at
            FROM orders
            WHERE status = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| Self::row_to_record(row)?.into_order())
            .collect()
    }

    async fn find_all(
        &self,
        skip: usize,
        limit: usize,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>> {
        let rows = sqlx::query(
            r#"
            SELECT id, order_number, client_id, vendor_id, version, items, status, total,
                   reservations, eta, delivery_address, delivery_date, contact_name,
                   contact_phone, notes, route_id, return_requested, return_reason,
                   return_status, created_at, updated_at
            FROM orders
            WHERE ($1::text IS NULL OR status = $1)
            ORDER BY created_at ASC, id ASC
            OFFSET $2 LIMIT $3
            "#,
        )
        .bind(status.map(|s| s.as_str()))
        .bind(skip as i64)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| Self::row_to_record(row)?.into_order())
            .collect()
    }

    async fn delete(&self, id: OrderId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn exists_by_id(&self, id: OrderId) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM orders WHERE id = $1)")
            .bind(id.as_uuid())
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }
}

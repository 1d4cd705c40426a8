use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{Executor, Postgres, Row};
use uuid::Uuid;

use super::{OrderMutation, OrderStore, OrderUpdate};
use crate::domain::order::{LineItem, NewOrder, Order, OrderError, OrderStatus, StorageError};
use crate::utils::{retry_on_transient, IsTransient, RetryConfig, RetryResult};

// ============================================================================
// PostgreSQL Order Store
// ============================================================================
//
// Tables: `orders` (one row per aggregate) and `order_items` (cascade-deleted
// with their order). Creation writes both tables in one transaction. Updates
// lock the order row with SELECT ... FOR UPDATE for the whole
// read-modify-write, so concurrent updates on one id are serialized by
// PostgreSQL while other ids proceed.
//
// ============================================================================

const SCHEMA: &str = include_str!("schema.sql");

pub struct PgOrderStore {
    pool: PgPool,
}

impl IsTransient for sqlx::Error {
    fn is_transient(&self) -> bool {
        matches!(
            self,
            sqlx::Error::Io(_)
                | sqlx::Error::Tls(_)
                | sqlx::Error::PoolTimedOut
                | sqlx::Error::WorkerCrashed
        )
    }
}

impl PgOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool, retrying transient connection failures with backoff
    pub async fn connect(
        url: &str,
        max_connections: u32,
        retry: RetryConfig,
    ) -> Result<Self, StorageError> {
        let url = url.to_string();

        let result = retry_on_transient(retry, |attempt| {
            let url = url.clone();
            async move {
                tracing::info!(attempt = attempt, "Connecting to PostgreSQL");
                PgPoolOptions::new()
                    .max_connections(max_connections)
                    .acquire_timeout(Duration::from_secs(5))
                    .connect(&url)
                    .await
            }
        })
        .await;

        match result {
            RetryResult::Success(pool) => Ok(Self::new(pool)),
            RetryResult::Failed(e) | RetryResult::PermanentFailure(e) => Err(e.into()),
        }
    }

    /// Create the tables if they do not exist yet
    pub async fn migrate(&self) -> Result<(), StorageError> {
        sqlx::raw_sql(SCHEMA).execute(&self.pool).await?;
        tracing::info!("Order schema ready");
        Ok(())
    }
}

fn order_from_row(row: &PgRow, items: Vec<LineItem>) -> Result<Order, OrderError> {
    let id: Uuid = row.try_get("id")?;
    let status: String = row.try_get("status")?;
    let status = status
        .parse::<OrderStatus>()
        .map_err(|e| StorageError::Corrupt {
            order_id: id,
            reason: e.to_string(),
        })?;

    Ok(Order {
        id,
        created_at: row.try_get("created_at")?,
        customer_id: row.try_get("customer_id")?,
        delivery_address: row.try_get("delivery_address")?,
        items,
        total_amount: row.try_get("total_amount")?,
        status,
    })
}

/// Items of the given orders, grouped by order id and kept in request order
async fn fetch_items<'e, E>(
    executor: E,
    order_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<LineItem>>, OrderError>
where
    E: Executor<'e, Database = Postgres>,
{
    let rows = sqlx::query(
        "SELECT order_id, id, product_id, product_description, quantity, unit_price
         FROM order_items
         WHERE order_id = ANY($1)
         ORDER BY order_id, position",
    )
    .bind(order_ids)
    .fetch_all(executor)
    .await?;

    let mut grouped: HashMap<Uuid, Vec<LineItem>> = HashMap::new();
    for row in rows {
        let order_id: Uuid = row.try_get("order_id")?;
        grouped.entry(order_id).or_default().push(LineItem {
            id: row.try_get("id")?,
            product_id: row.try_get("product_id")?,
            product_description: row.try_get("product_description")?,
            quantity: row.try_get("quantity")?,
            unit_price: row.try_get("unit_price")?,
        });
    }
    Ok(grouped)
}

fn insert_error(error: sqlx::Error, id: Uuid) -> OrderError {
    match &error {
        sqlx::Error::Database(db) if db.is_unique_violation() => StorageError::DuplicateId(id).into(),
        _ => error.into(),
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn create(&self, order: NewOrder) -> Result<Uuid, OrderError> {
        let id = Uuid::now_v7();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO orders (id, created_at, customer_id, delivery_address, total_amount, status)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(id)
        .bind(order.created_at)
        .bind(order.customer_id)
        .bind(&order.delivery_address)
        .bind(order.total_amount)
        .bind(order.status.as_str())
        .execute(&mut *tx)
        .await
        .map_err(|e| insert_error(e, id))?;

        for (position, item) in order.items.iter().enumerate() {
            sqlx::query(
                "INSERT INTO order_items
                    (id, order_id, position, product_id, product_description, quantity, unit_price)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
            .bind(item.id)
            .bind(id)
            .bind(position as i32)
            .bind(item.product_id)
            .bind(&item.product_description)
            .bind(item.quantity)
            .bind(item.unit_price)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::debug!(order_id = %id, item_count = order.items.len(), "Inserted order rows");
        Ok(id)
    }

    async fn get(&self, id: Uuid) -> Result<Order, OrderError> {
        let row = sqlx::query(
            "SELECT id, created_at, customer_id, delivery_address, total_amount, status
             FROM orders WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(OrderError::NotFound(id))?;

        let mut items = fetch_items(&self.pool, &[id]).await?;
        order_from_row(&row, items.remove(&id).unwrap_or_default())
    }

    async fn list_all(&self) -> Result<Vec<Order>, OrderError> {
        let heads = sqlx::query(
            "SELECT id, created_at, customer_id, delivery_address, total_amount, status
             FROM orders ORDER BY created_at, id",
        )
        .fetch_all(&self.pool)
        .await?;

        let ids = heads
            .iter()
            .map(|row| row.try_get::<Uuid, _>("id"))
            .collect::<Result<Vec<_>, _>>()?;
        let mut items = fetch_items(&self.pool, &ids).await?;

        heads
            .iter()
            .zip(ids)
            .map(|(row, id)| order_from_row(row, items.remove(&id).unwrap_or_default()))
            .collect()
    }

    async fn update(&self, id: Uuid, mutation: OrderMutation) -> Result<OrderUpdate, OrderError> {
        let mut tx = self.pool.begin().await?;

        // Dropping `tx` on any early return rolls the transaction back
        let row = sqlx::query(
            "SELECT id, created_at, customer_id, delivery_address, total_amount, status
             FROM orders WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(OrderError::NotFound(id))?;

        let mut items = fetch_items(&mut *tx, &[id]).await?;
        let mut order = order_from_row(&row, items.remove(&id).unwrap_or_default())?;

        let event = mutation(&mut order)?;

        // status is the only field with a post-creation mutation path
        if event.is_some() {
            sqlx::query("UPDATE orders SET status = $2 WHERE id = $1")
                .bind(id)
                .bind(order.status.as_str())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(OrderUpdate { order, event })
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
//
// Tests marked #[ignore] need a PostgreSQL instance:
//   DATABASE_URL=postgres://... cargo test -- --ignored
//
// ============================================================================

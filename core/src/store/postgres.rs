// core/src/store/postgres.rs

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::collections::HashMap;
use tracing::{debug, info, instrument};

use super::OrderStore;
use crate::error::StoreError;
use crate::models::{NewOrder, Order, OrderItem, OrderSummary, Product, UserSpend};

// Orders written by older schema variants may carry no total; the item sum stands in.
const ORDER_COLUMNS: &str = r#"
  o.id,
  o.user_id,
  COALESCE(o.total_amount, (SELECT SUM(oi.quantity * oi.unit_price) FROM order_items oi WHERE oi.order_id = o.id), 0) AS total_amount,
  o.created_at
"#;

// LIMIT is a signed BIGINT; anything past i64::MAX means "no limit".
fn sql_limit(limit: usize) -> i64 {
  i64::try_from(limit).unwrap_or(i64::MAX)
}

/// `OrderStore` over a PostgreSQL pool.
///
/// The pool is created and closed explicitly by the owner; nothing here is global.
#[derive(Clone)]
pub struct PgOrderStore {
  pool: PgPool,
}

impl PgOrderStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
    let pool = PgPoolOptions::new()
      .max_connections(max_connections)
      .connect(database_url)
      .await?;
    info!(max_connections, "Connected to the order database.");
    Ok(Self { pool })
  }

  pub fn pool(&self) -> &PgPool {
    &self.pool
  }

  /// Waits for checked-out connections to return, then closes the pool.
  pub async fn close(&self) {
    self.pool.close().await;
    info!("Order database pool closed.");
  }
}

#[async_trait]
impl OrderStore for PgOrderStore {
  #[instrument(name = "PgOrderStore::product_prices", skip(self, product_ids), fields(count = product_ids.len()), err(Display))]
  async fn product_prices(&self, product_ids: &[i64]) -> Result<HashMap<i64, f64>, StoreError> {
    let products: Vec<Product> = sqlx::query_as("SELECT id, price FROM products WHERE id = ANY($1)")
      .bind(product_ids)
      .fetch_all(&self.pool)
      .await?;
    Ok(products.into_iter().map(|p| (p.id, p.price)).collect())
  }

  #[instrument(name = "PgOrderStore::insert_order", skip(self, order), fields(user_id = order.user_id, items = order.items.len()), err(Display))]
  async fn insert_order(&self, order: &NewOrder) -> Result<Order, StoreError> {
    // Dropping `tx` on any early return rolls the whole order back.
    let mut tx = self.pool.begin().await?;

    let inserted: Order = sqlx::query_as(
      "INSERT INTO orders (user_id, total_amount) VALUES ($1, $2) RETURNING id, user_id, total_amount, created_at",
    )
    .bind(order.user_id)
    .bind(order.total_amount)
    .fetch_one(&mut *tx)
    .await?;

    for item in &order.items {
      sqlx::query("INSERT INTO order_items (order_id, product_id, quantity, unit_price) VALUES ($1, $2, $3, $4)")
        .bind(inserted.id)
        .bind(item.product_id)
        .bind(item.quantity)
        .bind(item.unit_price)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    debug!(order_id = inserted.id, "Order and items committed.");
    Ok(inserted)
  }

  async fn find_order(&self, order_id: i64) -> Result<Option<Order>, StoreError> {
    let order = sqlx::query_as(&format!("SELECT {} FROM orders o WHERE o.id = $1", ORDER_COLUMNS))
      .bind(order_id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(order)
  }

  async fn order_items(&self, order_id: i64) -> Result<Vec<OrderItem>, StoreError> {
    let items = sqlx::query_as(
      "SELECT order_id, product_id, quantity, unit_price FROM order_items WHERE order_id = $1 ORDER BY product_id",
    )
    .bind(order_id)
    .fetch_all(&self.pool)
    .await?;
    Ok(items)
  }

  #[instrument(name = "PgOrderStore::delete_order", skip(self), err(Display))]
  async fn delete_order(&self, order_id: i64) -> Result<bool, StoreError> {
    let mut tx = self.pool.begin().await?;

    // Items go first so the delete does not depend on ON DELETE CASCADE being present.
    sqlx::query("DELETE FROM order_items WHERE order_id = $1")
      .bind(order_id)
      .execute(&mut *tx)
      .await?;
    let deleted = sqlx::query("DELETE FROM orders WHERE id = $1")
      .bind(order_id)
      .execute(&mut *tx)
      .await?
      .rows_affected();

    tx.commit().await?;
    Ok(deleted > 0)
  }

  #[instrument(name = "PgOrderStore::order_summaries", skip(self), err(Display))]
  async fn order_summaries(&self) -> Result<Vec<OrderSummary>, StoreError> {
    let rows = sqlx::query_as(
      r#"
      SELECT
        o.id,
        o.user_id,
        o.created_at,
        COALESCE(o.total_amount, SUM(oi.quantity * oi.unit_price)) AS total
      FROM orders o
      LEFT JOIN order_items oi ON oi.order_id = o.id
      GROUP BY o.id, o.user_id, o.created_at, o.total_amount
      ORDER BY o.id
      "#,
    )
    .fetch_all(&self.pool)
    .await?;
    Ok(rows)
  }

  async fn spend_by_user(&self, limit: usize) -> Result<Vec<UserSpend>, StoreError> {
    let rows = sqlx::query_as(
      r#"
      SELECT o.user_id AS user_id, SUM(oi.quantity * oi.unit_price) AS total
      FROM orders o
      JOIN users u ON u.id = o.user_id
      JOIN order_items oi ON oi.order_id = o.id
      GROUP BY o.user_id
      ORDER BY total DESC
      LIMIT $1
      "#,
    )
    .bind(sql_limit(limit))
    .fetch_all(&self.pool)
    .await?;
    Ok(rows)
  }

  async fn recent_orders(&self, limit: usize) -> Result<Vec<Order>, StoreError> {
    let orders = sqlx::query_as(&format!(
      "SELECT {} FROM orders o ORDER BY o.id DESC LIMIT $1",
      ORDER_COLUMNS
    ))
    .bind(sql_limit(limit))
    .fetch_all(&self.pool)
    .await?;
    Ok(orders)
  }
}

#[cfg(test)]
mod tests {
  use super::sql_limit;

  #[test]
  #[cfg(target_pointer_width = "64")]
  fn oversized_limits_saturate_instead_of_wrapping() {
    assert_eq!(sql_limit(10), 10);
    assert_eq!(sql_limit(usize::MAX), i64::MAX);
  }
}

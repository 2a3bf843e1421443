// core/src/models/order.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use super::order_item::PricedItem;

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Order {
  pub id: i64,
  pub user_id: i64,
  // Sum of unit_price * quantity at creation time. Never recomputed.
  pub total_amount: f64,
  pub created_at: DateTime<Utc>,
}

/// A validated, priced order that has not been written yet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewOrder {
  pub user_id: i64,
  pub total_amount: f64,
  pub items: Vec<PricedItem>,
}

/// One row of the backfill aggregate.
///
/// Every column is optional because older schema variants leave
/// `total_amount` empty, in which case `total` falls back to the item sum.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct OrderSummary {
  pub id: i64,
  pub user_id: Option<i64>,
  pub created_at: Option<DateTime<Utc>>,
  pub total: Option<f64>,
}

// core/src/store/mod.rs

//! The relational system of record.
//!
//! `OrderStore` is the seam the services are written against. `PgOrderStore`
//! is the production implementation; `MemoryOrderStore` keeps everything in
//! process and can be told to fail, which is how the failure paths of the
//! services are exercised.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::error::StoreError;
use crate::models::{NewOrder, Order, OrderItem, OrderSummary, UserSpend};

pub mod memory;
pub mod postgres;

pub use memory::{MemoryOrderStore, StoreFault};
pub use postgres::PgOrderStore;

#[async_trait]
pub trait OrderStore: Send + Sync {
  /// Current price of each known product among `product_ids`, in one read.
  /// Unknown ids are simply absent from the map.
  async fn product_prices(&self, product_ids: &[i64]) -> Result<HashMap<i64, f64>, StoreError>;

  /// Writes the order row and all of its items in one transaction.
  /// Either everything is committed or nothing is.
  async fn insert_order(&self, order: &NewOrder) -> Result<Order, StoreError>;

  async fn find_order(&self, order_id: i64) -> Result<Option<Order>, StoreError>;

  async fn order_items(&self, order_id: i64) -> Result<Vec<OrderItem>, StoreError>;

  /// Deletes the order and its items in one transaction.
  /// Returns `false` when no such order exists.
  async fn delete_order(&self, order_id: i64) -> Result<bool, StoreError>;

  /// One row per order, with `total` falling back to the item sum when the
  /// stored total is empty. Feeds the mirror backfill.
  async fn order_summaries(&self) -> Result<Vec<OrderSummary>, StoreError>;

  /// Users ranked by spend, highest first. Fallback for the spenders report.
  async fn spend_by_user(&self, limit: usize) -> Result<Vec<UserSpend>, StoreError>;

  /// The last `limit` orders by descending id.
  async fn recent_orders(&self, limit: usize) -> Result<Vec<Order>, StoreError>;
}

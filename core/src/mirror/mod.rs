// core/src/mirror/mod.rs

//! The key-value mirror of the order data.
//!
//! Key layout:
//! - `order:<id>`        field map {id, user_id, total, created_at}
//! - `order:<id>:items`  JSON list of the order's priced items
//! - `orders`            set of every mirrored order id
//! - `product:sold_qty`  field map product id -> cumulative sold quantity
//!
//! `product:sold_qty` is the only per-product counter shape. Counters are
//! cumulative sales and are not decremented when an order is retracted.

use async_trait::async_trait;

use crate::error::MirrorError;
use crate::models::{MirrorRecord, PricedItem, ProductSales};

pub mod memory;
pub mod redis;

pub use self::memory::{MemoryMirror, MirrorFault};
pub use self::redis::RedisMirror;

pub const ORDER_KEY_PREFIX: &str = "order:";
pub const ORDER_KEY_PATTERN: &str = "order:*";
pub const ITEMS_KEY_SUFFIX: &str = ":items";
pub const ORDER_IDS_KEY: &str = "orders";
pub const SOLD_QTY_KEY: &str = "product:sold_qty";

pub fn order_key(order_id: i64) -> String {
  format!("{}{}", ORDER_KEY_PREFIX, order_id)
}

pub fn order_items_key(order_id: i64) -> String {
  format!("{}{}{}", ORDER_KEY_PREFIX, order_id, ITEMS_KEY_SUFFIX)
}

/// True for `order:<id>` keys, false for item blobs and anything else.
pub fn is_record_key(key: &str) -> bool {
  key
    .strip_prefix(ORDER_KEY_PREFIX)
    .is_some_and(|rest| !rest.is_empty() && !rest.contains(':'))
}

/// The order id of an `order:<id>` key.
pub fn record_key_id(key: &str) -> Option<i64> {
  key.strip_prefix(ORDER_KEY_PREFIX)?.parse().ok()
}

/// Puts record keys in ascending order id, the order `records` returns them in.
/// Keys without a numeric id sort first, by name.
pub fn sort_record_keys(keys: &mut [String]) {
  keys.sort_by_cached_key(|key| (record_key_id(key), key.clone()));
}

#[async_trait]
pub trait MirrorStore: Send + Sync {
  /// Overwrites the field map of `record.id` and adds the id to the id set.
  async fn publish(&self, record: &MirrorRecord) -> Result<(), MirrorError>;

  /// Stores the item blob and adds each item's quantity to its product counter.
  async fn publish_items(&self, order_id: i64, items: &[PricedItem]) -> Result<(), MirrorError>;

  /// Stores the item blob only. Used by read-repair, which must not count sales twice.
  async fn store_items(&self, order_id: i64, items: &[PricedItem]) -> Result<(), MirrorError>;

  /// Removes the field map, the item blob and the id set membership.
  /// Returns whether anything was actually removed.
  async fn retract(&self, order_id: i64) -> Result<bool, MirrorError>;

  /// True iff no `order:*` key exists.
  async fn is_empty(&self) -> Result<bool, MirrorError>;

  /// Number of `order:<id>` field maps present.
  async fn order_count(&self) -> Result<usize, MirrorError>;

  async fn fetch(&self, order_id: i64) -> Result<Option<MirrorRecord>, MirrorError>;

  async fn items(&self, order_id: i64) -> Result<Option<Vec<PricedItem>>, MirrorError>;

  /// Every decodable order record. Undecodable entries are skipped.
  async fn records(&self) -> Result<Vec<MirrorRecord>, MirrorError>;

  async fn sold_quantities(&self) -> Result<Vec<ProductSales>, MirrorError>;
}

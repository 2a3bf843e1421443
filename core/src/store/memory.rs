// core/src/store/memory.rs

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};

use super::OrderStore;
use crate::error::StoreError;
use crate::models::{NewOrder, Order, OrderItem, OrderSummary, UserSpend};

/// Which store operation a forced failure applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreFault {
  PriceLookup,
  Insert,
  Delete,
  Aggregate,
}

#[derive(Debug, Clone)]
struct StoredOrder {
  id: i64,
  user_id: i64,
  total_amount: Option<f64>,
  created_at: chrono::DateTime<Utc>,
}

#[derive(Debug, Default)]
struct StoreState {
  next_order_id: i64,
  products: BTreeMap<i64, f64>,
  users: BTreeMap<i64, String>,
  orders: BTreeMap<i64, StoredOrder>,
  items: Vec<OrderItem>,
}

impl StoreState {
  fn item_sum(&self, order_id: i64) -> Option<f64> {
    let mut lines = self.items.iter().filter(|i| i.order_id == order_id).peekable();
    lines.peek()?;
    Some(lines.map(|i| i.quantity * i.unit_price).sum())
  }

  fn to_order(&self, stored: &StoredOrder) -> Order {
    Order {
      id: stored.id,
      user_id: stored.user_id,
      total_amount: stored
        .total_amount
        .or_else(|| self.item_sum(stored.id))
        .unwrap_or_default(),
      created_at: stored.created_at,
    }
  }
}

/// In-process `OrderStore`.
///
/// Behaves like the PostgreSQL store, including all-or-nothing inserts and
/// the item-sum fallback for orders without a stored total. Individual
/// operations can be forced to fail with [`MemoryOrderStore::fail`].
#[derive(Debug, Default)]
pub struct MemoryOrderStore {
  state: Mutex<StoreState>,
  fail_price_lookup: AtomicBool,
  fail_insert: AtomicBool,
  fail_delete: AtomicBool,
  fail_aggregate: AtomicBool,
}

impl MemoryOrderStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_product(self, product_id: i64, price: f64) -> Self {
    self.state.lock().products.insert(product_id, price);
    self
  }

  pub fn with_user(self, user_id: i64, name: &str) -> Self {
    self.state.lock().users.insert(user_id, name.to_string());
    self
  }

  /// Changes a product price. Existing orders keep their snapshotted prices.
  pub fn set_price(&self, product_id: i64, price: f64) {
    self.state.lock().products.insert(product_id, price);
  }

  pub fn fail(&self, fault: StoreFault, enabled: bool) {
    let flag = match fault {
      StoreFault::PriceLookup => &self.fail_price_lookup,
      StoreFault::Insert => &self.fail_insert,
      StoreFault::Delete => &self.fail_delete,
      StoreFault::Aggregate => &self.fail_aggregate,
    };
    flag.store(enabled, Ordering::SeqCst);
  }

  /// Stores an order the way older schema variants did: without a total.
  pub fn insert_untotalled_order(&self, user_id: i64, items: &[(i64, f64, f64)]) -> i64 {
    let mut state = self.state.lock();
    state.next_order_id += 1;
    let id = state.next_order_id;
    state.orders.insert(
      id,
      StoredOrder {
        id,
        user_id,
        total_amount: None,
        created_at: Utc::now(),
      },
    );
    for &(product_id, quantity, unit_price) in items {
      state.items.push(OrderItem {
        order_id: id,
        product_id,
        quantity,
        unit_price,
      });
    }
    id
  }

  pub fn order_count(&self) -> usize {
    self.state.lock().orders.len()
  }

  pub fn item_count(&self) -> usize {
    self.state.lock().items.len()
  }

  fn check(&self, flag: &AtomicBool, operation: &str) -> Result<(), StoreError> {
    if flag.load(Ordering::SeqCst) {
      return Err(StoreError::Backend(format!("forced failure in {}", operation)));
    }
    Ok(())
  }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
  async fn product_prices(&self, product_ids: &[i64]) -> Result<HashMap<i64, f64>, StoreError> {
    self.check(&self.fail_price_lookup, "product_prices")?;
    let state = self.state.lock();
    Ok(
      product_ids
        .iter()
        .filter_map(|id| state.products.get(id).map(|price| (*id, *price)))
        .collect(),
    )
  }

  async fn insert_order(&self, order: &NewOrder) -> Result<Order, StoreError> {
    self.check(&self.fail_insert, "insert_order")?;
    let mut state = self.state.lock();

    // Stand-in for the foreign key on order_items.product_id. Checked before
    // anything is written so a rejected order leaves no rows behind.
    if let Some(item) = order.items.iter().find(|i| !state.products.contains_key(&i.product_id)) {
      return Err(StoreError::Backend(format!(
        "order_items.product_id {} violates foreign key",
        item.product_id
      )));
    }

    state.next_order_id += 1;
    let stored = StoredOrder {
      id: state.next_order_id,
      user_id: order.user_id,
      total_amount: Some(order.total_amount),
      created_at: Utc::now(),
    };
    for item in &order.items {
      state.items.push(OrderItem {
        order_id: stored.id,
        product_id: item.product_id,
        quantity: item.quantity,
        unit_price: item.unit_price,
      });
    }
    let inserted = state.to_order(&stored);
    state.orders.insert(stored.id, stored);
    Ok(inserted)
  }

  async fn find_order(&self, order_id: i64) -> Result<Option<Order>, StoreError> {
    let state = self.state.lock();
    Ok(state.orders.get(&order_id).map(|o| state.to_order(o)))
  }

  async fn order_items(&self, order_id: i64) -> Result<Vec<OrderItem>, StoreError> {
    let state = self.state.lock();
    let mut items: Vec<OrderItem> = state.items.iter().filter(|i| i.order_id == order_id).cloned().collect();
    items.sort_by_key(|i| i.product_id);
    Ok(items)
  }

  async fn delete_order(&self, order_id: i64) -> Result<bool, StoreError> {
    self.check(&self.fail_delete, "delete_order")?;
    let mut state = self.state.lock();
    if state.orders.remove(&order_id).is_none() {
      return Ok(false);
    }
    state.items.retain(|i| i.order_id != order_id);
    Ok(true)
  }

  async fn order_summaries(&self) -> Result<Vec<OrderSummary>, StoreError> {
    self.check(&self.fail_aggregate, "order_summaries")?;
    let state = self.state.lock();
    Ok(
      state
        .orders
        .values()
        .map(|o| OrderSummary {
          id: o.id,
          user_id: Some(o.user_id),
          created_at: Some(o.created_at),
          total: o.total_amount.or_else(|| state.item_sum(o.id)),
        })
        .collect(),
    )
  }

  async fn spend_by_user(&self, limit: usize) -> Result<Vec<UserSpend>, StoreError> {
    self.check(&self.fail_aggregate, "spend_by_user")?;
    let state = self.state.lock();
    let mut spend: Vec<UserSpend> = Vec::new();
    for order in state.orders.values() {
      if !state.users.contains_key(&order.user_id) {
        continue;
      }
      let Some(total) = state.item_sum(order.id) else {
        continue;
      };
      match spend.iter_mut().find(|s| s.user_id == order.user_id) {
        Some(entry) => entry.total += total,
        None => spend.push(UserSpend {
          user_id: order.user_id,
          total,
        }),
      }
    }
    spend.sort_by(|a, b| b.total.total_cmp(&a.total));
    spend.truncate(limit);
    Ok(spend)
  }

  async fn recent_orders(&self, limit: usize) -> Result<Vec<Order>, StoreError> {
    let state = self.state.lock();
    Ok(state.orders.values().rev().take(limit).map(|o| state.to_order(o)).collect())
  }
}

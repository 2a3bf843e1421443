// core/src/mirror/memory.rs

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tracing::warn;

use super::{order_key, MirrorStore};
use crate::error::MirrorError;
use crate::models::{MirrorRecord, PricedItem, ProductSales};

/// Which mirror operation a forced failure applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorFault {
  Publish,
  PublishItems,
  Retract,
  Read,
  /// Only `order_count`; `is_empty` keeps answering.
  Count,
}

#[derive(Debug, Default)]
struct MirrorState {
  records: BTreeMap<i64, HashMap<String, String>>,
  item_blobs: BTreeMap<i64, String>,
  order_ids: BTreeSet<i64>,
  sold_qty: BTreeMap<i64, f64>,
}

/// In-process `MirrorStore` with the same key semantics as the Redis mirror.
///
/// Records iterate in ascending order id. Every successful mutating call bumps
/// [`MemoryMirror::write_count`], so tests can assert that a path wrote nothing.
#[derive(Debug, Default)]
pub struct MemoryMirror {
  state: Mutex<MirrorState>,
  writes: AtomicUsize,
  fail_publish: AtomicBool,
  fail_publish_items: AtomicBool,
  fail_retract: AtomicBool,
  fail_read: AtomicBool,
  fail_count: AtomicBool,
}

impl MemoryMirror {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn fail(&self, fault: MirrorFault, enabled: bool) {
    let flag = match fault {
      MirrorFault::Publish => &self.fail_publish,
      MirrorFault::PublishItems => &self.fail_publish_items,
      MirrorFault::Retract => &self.fail_retract,
      MirrorFault::Read => &self.fail_read,
      MirrorFault::Count => &self.fail_count,
    };
    flag.store(enabled, Ordering::SeqCst);
  }

  pub fn write_count(&self) -> usize {
    self.writes.load(Ordering::SeqCst)
  }

  pub fn contains_record(&self, order_id: i64) -> bool {
    self.state.lock().records.contains_key(&order_id)
  }

  pub fn is_member(&self, order_id: i64) -> bool {
    self.state.lock().order_ids.contains(&order_id)
  }

  pub fn has_items(&self, order_id: i64) -> bool {
    self.state.lock().item_blobs.contains_key(&order_id)
  }

  pub fn sold_quantity(&self, product_id: i64) -> Option<f64> {
    self.state.lock().sold_qty.get(&product_id).copied()
  }

  /// Raw field map of `order:<id>`, exactly as stored.
  pub fn raw_fields(&self, order_id: i64) -> Option<HashMap<String, String>> {
    self.state.lock().records.get(&order_id).cloned()
  }

  /// Writes a field map without validation, e.g. to plant a corrupt entry.
  pub fn insert_raw(&self, order_id: i64, fields: &[(&str, &str)]) {
    let map = fields.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    let mut state = self.state.lock();
    state.records.insert(order_id, map);
    state.order_ids.insert(order_id);
  }

  fn check(&self, flag: &AtomicBool, operation: &str) -> Result<(), MirrorError> {
    if flag.load(Ordering::SeqCst) {
      return Err(MirrorError::Backend(format!("forced failure in {}", operation)));
    }
    Ok(())
  }

  fn wrote(&self) {
    self.writes.fetch_add(1, Ordering::SeqCst);
  }
}

#[async_trait]
impl MirrorStore for MemoryMirror {
  async fn publish(&self, record: &MirrorRecord) -> Result<(), MirrorError> {
    self.check(&self.fail_publish, "publish")?;
    let fields = record
      .to_fields()
      .into_iter()
      .map(|(k, v)| (k.to_string(), v))
      .collect();
    {
      let mut state = self.state.lock();
      state.records.insert(record.id, fields);
      state.order_ids.insert(record.id);
    }
    self.wrote();
    Ok(())
  }

  async fn publish_items(&self, order_id: i64, items: &[PricedItem]) -> Result<(), MirrorError> {
    self.check(&self.fail_publish_items, "publish_items")?;
    let json = serde_json::to_string(items)?;
    {
      let mut state = self.state.lock();
      state.item_blobs.insert(order_id, json);
      for item in items {
        *state.sold_qty.entry(item.product_id).or_insert(0.0) += item.quantity;
      }
    }
    self.wrote();
    Ok(())
  }

  async fn store_items(&self, order_id: i64, items: &[PricedItem]) -> Result<(), MirrorError> {
    self.check(&self.fail_publish_items, "store_items")?;
    let json = serde_json::to_string(items)?;
    self.state.lock().item_blobs.insert(order_id, json);
    self.wrote();
    Ok(())
  }

  async fn retract(&self, order_id: i64) -> Result<bool, MirrorError> {
    self.check(&self.fail_retract, "retract")?;
    let removed = {
      let mut state = self.state.lock();
      let record = state.records.remove(&order_id).is_some();
      let member = state.order_ids.remove(&order_id);
      let blob = state.item_blobs.remove(&order_id).is_some();
      record || member || blob
    };
    if removed {
      self.wrote();
    }
    Ok(removed)
  }

  async fn is_empty(&self) -> Result<bool, MirrorError> {
    self.check(&self.fail_read, "is_empty")?;
    let state = self.state.lock();
    Ok(state.records.is_empty() && state.item_blobs.is_empty())
  }

  async fn order_count(&self) -> Result<usize, MirrorError> {
    self.check(&self.fail_read, "order_count")?;
    self.check(&self.fail_count, "order_count")?;
    Ok(self.state.lock().records.len())
  }

  async fn fetch(&self, order_id: i64) -> Result<Option<MirrorRecord>, MirrorError> {
    self.check(&self.fail_read, "fetch")?;
    let fields = self.state.lock().records.get(&order_id).cloned();
    fields
      .map(|f| MirrorRecord::from_fields(&order_key(order_id), &f))
      .transpose()
  }

  async fn items(&self, order_id: i64) -> Result<Option<Vec<PricedItem>>, MirrorError> {
    self.check(&self.fail_read, "items")?;
    let json = self.state.lock().item_blobs.get(&order_id).cloned();
    match json {
      Some(j) => Ok(Some(serde_json::from_str(&j)?)),
      None => Ok(None),
    }
  }

  async fn records(&self) -> Result<Vec<MirrorRecord>, MirrorError> {
    self.check(&self.fail_read, "records")?;
    let state = self.state.lock();
    let mut records = Vec::with_capacity(state.records.len());
    for (order_id, fields) in &state.records {
      match MirrorRecord::from_fields(&order_key(*order_id), fields) {
        Ok(record) => records.push(record),
        Err(e) => warn!(error = %e, "Skipping undecodable mirror record"),
      }
    }
    Ok(records)
  }

  async fn sold_quantities(&self) -> Result<Vec<ProductSales>, MirrorError> {
    self.check(&self.fail_read, "sold_quantities")?;
    Ok(
      self
        .state
        .lock()
        .sold_qty
        .iter()
        .map(|(product_id, quantity)| ProductSales {
          product_id: *product_id,
          quantity: *quantity,
        })
        .collect(),
    )
  }
}

// core/src/service/write.rs

//! Create and delete, keeping the mirror in step with the system of record.
//!
//! The relational write always decides the outcome. The mirror is written
//! only after a successful commit, and a mirror failure is reported next to
//! the committed result instead of replacing it.

use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

use super::DRIFT_TARGET;
use crate::error::{MirrorError, OrderError, Result};
use crate::mirror::MirrorStore;
use crate::models::{MirrorRecord, Order, OrderRequest, PricedItem};
use crate::pricing;
use crate::store::OrderStore;

/// A committed order, and whether its mirror record was published.
#[derive(Debug)]
pub enum CreateOutcome {
  Persisted { order_id: i64 },
  /// The order is committed but the mirror does not reflect it yet.
  PersistedMirrorFailed { order_id: i64, error: MirrorError },
}

impl CreateOutcome {
  pub fn order_id(&self) -> i64 {
    match self {
      CreateOutcome::Persisted { order_id } | CreateOutcome::PersistedMirrorFailed { order_id, .. } => *order_id,
    }
  }

  pub fn is_mirrored(&self) -> bool {
    matches!(self, CreateOutcome::Persisted { .. })
  }
}

#[derive(Debug)]
pub enum DeleteOutcome {
  NotFound,
  Deleted,
  /// The order is gone but stale mirror entries may remain.
  DeletedMirrorFailed { error: MirrorError },
}

impl DeleteOutcome {
  pub fn deleted(&self) -> bool {
    !matches!(self, DeleteOutcome::NotFound)
  }

  pub fn is_mirrored(&self) -> bool {
    !matches!(self, DeleteOutcome::DeletedMirrorFailed { .. })
  }
}

#[derive(Clone)]
pub struct OrderWriteService {
  store: Arc<dyn OrderStore>,
  mirror: Arc<dyn MirrorStore>,
}

impl OrderWriteService {
  pub fn new(store: Arc<dyn OrderStore>, mirror: Arc<dyn MirrorStore>) -> Self {
    Self { store, mirror }
  }

  /// Validates, prices and persists a new order, then mirrors it.
  ///
  /// Returns `Err(OrderError::Validation)` before any I/O for bad input and
  /// `Err(OrderError::Persistence)` when the price lookup or the transaction
  /// fails; nothing is committed in either case.
  #[instrument(
    name = "OrderWriteService::create",
    skip(self, request),
    fields(user_id = ?request.user_id, lines = request.items.len()),
    err(Display)
  )]
  pub async fn create(&self, request: &OrderRequest) -> Result<CreateOutcome> {
    let user_id = pricing::validate_request(request)?;

    let prices = self.store.product_prices(&request.product_ids()).await.map_err(|e| {
      error!(error = %e, "Price lookup failed.");
      OrderError::from(e)
    })?;
    let new_order = pricing::price_order(user_id, &request.items, &prices)?;

    let order = self.store.insert_order(&new_order).await.map_err(|e| {
      error!(error = %e, "Order transaction rolled back.");
      OrderError::from(e)
    })?;
    info!(order_id = order.id, total = order.total_amount, "Order persisted.");

    match self.publish(&order, &new_order.items).await {
      Ok(()) => Ok(CreateOutcome::Persisted { order_id: order.id }),
      Err(error) => {
        warn!(target: DRIFT_TARGET, order_id = order.id, error = %error, "Order persisted but not mirrored.");
        Ok(CreateOutcome::PersistedMirrorFailed {
          order_id: order.id,
          error,
        })
      }
    }
  }

  /// Deletes an order and its items, then retracts its mirror entries.
  ///
  /// A missing order is `Ok(DeleteOutcome::NotFound)`. A failed relational
  /// delete is rolled back and returned as an error.
  #[instrument(name = "OrderWriteService::delete", skip(self), err(Display))]
  pub async fn delete(&self, order_id: i64) -> Result<DeleteOutcome> {
    if self.store.find_order(order_id).await?.is_none() {
      info!("Order not found, nothing to delete.");
      return Ok(DeleteOutcome::NotFound);
    }

    let deleted = self.store.delete_order(order_id).await.map_err(|e| {
      error!(error = %e, "Order delete rolled back.");
      OrderError::from(e)
    })?;
    if !deleted {
      // Removed by someone else between the lookup and the delete.
      return Ok(DeleteOutcome::NotFound);
    }
    info!("Order deleted.");

    match self.mirror.retract(order_id).await {
      Ok(removed) => {
        debug!(removed, "Mirror entries retracted.");
        Ok(DeleteOutcome::Deleted)
      }
      Err(error) => {
        warn!(target: DRIFT_TARGET, order_id, error = %error, "Order deleted but mirror entries remain.");
        Ok(DeleteOutcome::DeletedMirrorFailed { error })
      }
    }
  }

  /// Read-repair for a single order.
  ///
  /// Re-publishes the record and item blob from the system of record without
  /// touching the sales counters. If the order no longer exists, any stale
  /// mirror entries are retracted instead. Returns whether the order exists.
  #[instrument(name = "OrderWriteService::republish", skip(self), err(Display))]
  pub async fn republish(&self, order_id: i64) -> Result<bool> {
    let Some(order) = self.store.find_order(order_id).await? else {
      let removed = self.mirror.retract(order_id).await?;
      info!(removed, "Order absent from the store; stale mirror entries retracted.");
      return Ok(false);
    };

    let items: Vec<PricedItem> = self
      .store
      .order_items(order_id)
      .await?
      .into_iter()
      .map(PricedItem::from)
      .collect();
    self.mirror.publish(&MirrorRecord::from_order(&order)).await?;
    self.mirror.store_items(order_id, &items).await?;
    info!(items = items.len(), "Order republished to the mirror.");
    Ok(true)
  }

  async fn publish(&self, order: &Order, items: &[PricedItem]) -> std::result::Result<(), MirrorError> {
    self.mirror.publish(&MirrorRecord::from_order(order)).await?;
    self.mirror.publish_items(order.id, items).await?;
    Ok(())
  }
}

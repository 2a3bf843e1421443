// core/src/service/report.rs

//! Read-only reports served from the mirror.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::error::Result;
use crate::mirror::MirrorStore;
use crate::models::{MirrorRecord, Order, ProductSales, UserSpend};
use crate::store::OrderStore;

/// Sums `total` per user across mirror records, highest first.
///
/// Records without a user or a total are ignored. Ties keep the order in
/// which each user was first encountered.
pub fn rank_spenders(records: &[MirrorRecord]) -> Vec<UserSpend> {
  let mut positions: HashMap<i64, usize> = HashMap::new();
  let mut spend: Vec<UserSpend> = Vec::new();
  for record in records {
    let (Some(user_id), Some(total)) = (record.user_id, record.total) else {
      continue;
    };
    match positions.get(&user_id) {
      Some(&idx) => spend[idx].total += total,
      None => {
        positions.insert(user_id, spend.len());
        spend.push(UserSpend { user_id, total });
      }
    }
  }
  // Stable sort, so equal totals stay in first-encountered order.
  spend.sort_by(|a, b| b.total.total_cmp(&a.total));
  spend
}

/// Products ranked by cumulative sold quantity, highest first. Ties go to
/// the lower product id, since hash reads come back in no fixed order.
pub fn rank_sellers(mut sales: Vec<ProductSales>) -> Vec<ProductSales> {
  sales.sort_by(|a, b| {
    b.quantity
      .total_cmp(&a.quantity)
      .then_with(|| a.product_id.cmp(&b.product_id))
  });
  sales
}

/// Consumer of the mirror. Never writes to either store.
#[derive(Clone)]
pub struct ReportQueryService {
  store: Arc<dyn OrderStore>,
  mirror: Arc<dyn MirrorStore>,
}

impl ReportQueryService {
  pub fn new(store: Arc<dyn OrderStore>, mirror: Arc<dyn MirrorStore>) -> Self {
    Self { store, mirror }
  }

  /// Top `limit` users by total spend.
  ///
  /// Served from the mirror; falls back to the relational aggregate when the
  /// mirror yields no usable rows or cannot be read.
  #[instrument(name = "ReportQueryService::highest_spenders", skip(self), err(Display))]
  pub async fn highest_spenders(&self, limit: usize) -> Result<Vec<UserSpend>> {
    let records = self.mirror.records().await.unwrap_or_else(|e| {
      warn!(error = %e, "Mirror read failed, using the store aggregate.");
      Vec::new()
    });

    let mut ranked = rank_spenders(&records);
    if ranked.is_empty() {
      info!("Mirror has no spend data, using the store aggregate.");
      return Ok(self.store.spend_by_user(limit).await?);
    }
    ranked.truncate(limit);
    Ok(ranked)
  }

  /// Top `limit` products by cumulative sold quantity.
  #[instrument(name = "ReportQueryService::best_sellers", skip(self), err(Display))]
  pub async fn best_sellers(&self, limit: usize) -> Result<Vec<ProductSales>> {
    let mut ranked = rank_sellers(self.mirror.sold_quantities().await?);
    ranked.truncate(limit);
    Ok(ranked)
  }

  /// The mirror record of one order, if present.
  pub async fn order(&self, order_id: i64) -> Result<Option<MirrorRecord>> {
    Ok(self.mirror.fetch(order_id).await?)
  }

  /// The last `limit` orders, read from the system of record.
  pub async fn recent_orders(&self, limit: usize) -> Result<Vec<Order>> {
    Ok(self.store.recent_orders(limit).await?)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn record(id: i64, user_id: Option<i64>, total: Option<f64>) -> MirrorRecord {
    MirrorRecord {
      id,
      user_id,
      total,
      created_at: None,
    }
  }

  #[test]
  fn spend_is_summed_per_user_and_ranked_descending() {
    let records = vec![
      record(1, Some(10), Some(5.0)),
      record(2, Some(20), Some(30.0)),
      record(3, Some(10), Some(40.0)),
      record(4, None, Some(99.0)),
      record(5, Some(30), None),
    ];
    let ranked = rank_spenders(&records);
    assert_eq!(
      ranked,
      vec![
        UserSpend { user_id: 10, total: 45.0 },
        UserSpend { user_id: 20, total: 30.0 },
      ]
    );
  }

  #[test]
  fn equal_spend_keeps_first_encountered_order() {
    let records = vec![
      record(1, Some(3), Some(10.0)),
      record(2, Some(1), Some(10.0)),
      record(3, Some(2), Some(10.0)),
    ];
    let users: Vec<i64> = rank_spenders(&records).iter().map(|s| s.user_id).collect();
    assert_eq!(users, vec![3, 1, 2]);
  }

  #[test]
  fn sellers_rank_by_quantity() {
    let sales = vec![
      ProductSales { product_id: 1, quantity: 2.0 },
      ProductSales { product_id: 2, quantity: 7.5 },
      ProductSales { product_id: 3, quantity: 2.0 },
    ];
    let ids: Vec<i64> = rank_sellers(sales).iter().map(|s| s.product_id).collect();
    assert_eq!(ids, vec![2, 1, 3]);
  }
}

// core/src/mirror/redis.rs

use ::redis::AsyncCommands;
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::{debug, info, warn};

use super::{is_record_key, order_items_key, order_key, sort_record_keys, MirrorStore, ORDER_IDS_KEY, ORDER_KEY_PATTERN, SOLD_QTY_KEY};
use crate::error::MirrorError;
use crate::models::{MirrorRecord, PricedItem, ProductSales};

/// `MirrorStore` over Redis.
#[derive(Clone)]
pub struct RedisMirror {
  client: ::redis::Client,
}

impl RedisMirror {
  /// Opens a client for `redis_url`. No connection is made until first use.
  pub fn new(redis_url: &str) -> Result<Self, MirrorError> {
    let client = ::redis::Client::open(redis_url)?;
    Ok(Self { client })
  }

  async fn get_connection(&self) -> Result<::redis::aio::MultiplexedConnection, MirrorError> {
    let conn = self.client.get_multiplexed_async_connection().await?;
    Ok(conn)
  }

  /// Round-trips a PING. Used at startup to fail fast on a bad URL.
  pub async fn ping(&self) -> Result<(), MirrorError> {
    let mut conn = self.get_connection().await?;
    let _: String = ::redis::cmd("PING").query_async(&mut conn).await?;
    info!("Connected to the order mirror.");
    Ok(())
  }

  async fn order_keys(&self, conn: &mut ::redis::aio::MultiplexedConnection) -> Result<Vec<String>, MirrorError> {
    let keys: Vec<String> = conn.keys(ORDER_KEY_PATTERN).await?;
    Ok(keys)
  }
}

#[async_trait]
impl MirrorStore for RedisMirror {
  async fn publish(&self, record: &MirrorRecord) -> Result<(), MirrorError> {
    let mut conn = self.get_connection().await?;
    let key = order_key(record.id);
    let fields = record.to_fields();

    let _: () = ::redis::pipe()
      .atomic()
      .hset_multiple(&key, fields.as_slice())
      .ignore()
      .sadd(ORDER_IDS_KEY, record.id)
      .ignore()
      .query_async(&mut conn)
      .await?;
    debug!("Published mirror record '{}'", key);
    Ok(())
  }

  async fn publish_items(&self, order_id: i64, items: &[PricedItem]) -> Result<(), MirrorError> {
    let mut conn = self.get_connection().await?;
    let json = serde_json::to_string(items)?;

    let mut pipe = ::redis::pipe();
    pipe.atomic().set(order_items_key(order_id), json).ignore();
    for item in items {
      // f64 deltas go out as HINCRBYFLOAT.
      pipe.hincr(SOLD_QTY_KEY, item.product_id, item.quantity).ignore();
    }
    let _: () = pipe.query_async(&mut conn).await?;
    debug!(order_id, items = items.len(), "Published mirror items and sales counters");
    Ok(())
  }

  async fn store_items(&self, order_id: i64, items: &[PricedItem]) -> Result<(), MirrorError> {
    let mut conn = self.get_connection().await?;
    let json = serde_json::to_string(items)?;
    conn.set::<_, _, ()>(order_items_key(order_id), json).await?;
    Ok(())
  }

  async fn retract(&self, order_id: i64) -> Result<bool, MirrorError> {
    let mut conn = self.get_connection().await?;
    let (records, members, blobs): (i64, i64, i64) = ::redis::pipe()
      .atomic()
      .del(order_key(order_id))
      .srem(ORDER_IDS_KEY, order_id)
      .del(order_items_key(order_id))
      .query_async(&mut conn)
      .await?;
    debug!(order_id, records, members, blobs, "Retracted mirror entries");
    Ok(records + members + blobs > 0)
  }

  async fn is_empty(&self) -> Result<bool, MirrorError> {
    let mut conn = self.get_connection().await?;
    Ok(self.order_keys(&mut conn).await?.is_empty())
  }

  async fn order_count(&self) -> Result<usize, MirrorError> {
    let mut conn = self.get_connection().await?;
    let keys = self.order_keys(&mut conn).await?;
    Ok(keys.iter().filter(|k| is_record_key(k)).count())
  }

  async fn fetch(&self, order_id: i64) -> Result<Option<MirrorRecord>, MirrorError> {
    let mut conn = self.get_connection().await?;
    let key = order_key(order_id);
    let fields: HashMap<String, String> = conn.hgetall(&key).await?;
    if fields.is_empty() {
      return Ok(None);
    }
    MirrorRecord::from_fields(&key, &fields).map(Some)
  }

  async fn items(&self, order_id: i64) -> Result<Option<Vec<PricedItem>>, MirrorError> {
    let mut conn = self.get_connection().await?;
    let json: Option<String> = conn.get(order_items_key(order_id)).await?;
    match json {
      Some(j) => Ok(Some(serde_json::from_str(&j)?)),
      None => Ok(None),
    }
  }

  async fn records(&self) -> Result<Vec<MirrorRecord>, MirrorError> {
    let mut conn = self.get_connection().await?;
    let mut keys: Vec<String> = self
      .order_keys(&mut conn)
      .await?
      .into_iter()
      .filter(|k| is_record_key(k))
      .collect();
    // KEYS has no ordering; spender ties depend on records coming back by id.
    sort_record_keys(&mut keys);
    if keys.is_empty() {
      return Ok(Vec::new());
    }

    let mut pipe = ::redis::pipe();
    for key in &keys {
      pipe.hgetall(key);
    }
    let maps: Vec<HashMap<String, String>> = pipe.query_async(&mut conn).await?;

    let mut records = Vec::with_capacity(maps.len());
    for (key, fields) in keys.iter().zip(maps) {
      if fields.is_empty() {
        continue;
      }
      match MirrorRecord::from_fields(key, &fields) {
        Ok(record) => records.push(record),
        Err(e) => warn!(error = %e, "Skipping undecodable mirror record"),
      }
    }
    Ok(records)
  }

  async fn sold_quantities(&self) -> Result<Vec<ProductSales>, MirrorError> {
    let mut conn = self.get_connection().await?;
    let raw: Vec<(String, String)> = conn.hgetall(SOLD_QTY_KEY).await?;
    raw
      .into_iter()
      .map(|(product, quantity)| -> Result<ProductSales, MirrorError> {
        let corrupt = |reason: String| MirrorError::Corrupt {
          key: SOLD_QTY_KEY.to_string(),
          reason,
        };
        Ok(ProductSales {
          product_id: product
            .parse()
            .map_err(|e| corrupt(format!("bad product id '{}': {}", product, e)))?,
          quantity: quantity
            .parse()
            .map_err(|e| corrupt(format!("bad quantity '{}': {}", quantity, e)))?,
        })
      })
      .collect()
  }
}

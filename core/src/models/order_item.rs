// core/src/models/order_item.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct OrderItem {
  pub order_id: i64,
  pub product_id: i64,
  pub quantity: f64,
  pub unit_price: f64, // Snapshot taken when the order was created
}

/// A line item before it is attached to an order id.
///
/// This is also the element type of the `order:<id>:items` blob in the mirror.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricedItem {
  pub product_id: i64,
  pub quantity: f64,
  pub unit_price: f64,
}

impl PricedItem {
  pub fn subtotal(&self) -> f64 {
    self.unit_price * self.quantity
  }
}

impl From<OrderItem> for PricedItem {
  fn from(item: OrderItem) -> Self {
    PricedItem {
      product_id: item.product_id,
      quantity: item.quantity,
      unit_price: item.unit_price,
    }
  }
}

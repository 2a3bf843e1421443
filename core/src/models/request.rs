// core/src/models/request.rs

//! Inbound shapes for order creation, as they arrive from callers.

use serde::{Deserialize, Serialize};

/// A requested quantity before coercion.
///
/// Callers send either a JSON number or a string; both are accepted here and
/// only rejected during pricing if they do not hold a finite number. Any other
/// JSON value (null, bool, array, object) lands in `Other` so that pricing can
/// reject it with the ordinary validation message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Quantity {
  Number(f64),
  Text(String),
  Other(serde_json::Value),
}

impl Default for Quantity {
  fn default() -> Self {
    Quantity::Other(serde_json::Value::Null)
  }
}

impl Quantity {
  /// Coerces the quantity to a finite `f64`, or `None` if it is non-numeric.
  pub fn as_number(&self) -> Option<f64> {
    let value = match self {
      Quantity::Number(n) => *n,
      Quantity::Text(s) => s.trim().parse::<f64>().ok()?,
      Quantity::Other(_) => return None,
    };
    value.is_finite().then_some(value)
  }
}

impl From<f64> for Quantity {
  fn from(value: f64) -> Self {
    Quantity::Number(value)
  }
}

impl From<&str> for Quantity {
  fn from(value: &str) -> Self {
    Quantity::Text(value.to_string())
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
  pub product_id: i64,
  #[serde(default)]
  pub quantity: Quantity,
}

impl OrderLine {
  pub fn new(product_id: i64, quantity: impl Into<Quantity>) -> Self {
    OrderLine {
      product_id,
      quantity: quantity.into(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
  #[serde(default)]
  pub user_id: Option<i64>,
  #[serde(default)]
  pub items: Vec<OrderLine>,
}

impl OrderRequest {
  pub fn new(user_id: i64, items: Vec<OrderLine>) -> Self {
    OrderRequest {
      user_id: Some(user_id),
      items,
    }
  }

  /// Distinct product ids in first-seen order, for the batch price lookup.
  pub fn product_ids(&self) -> Vec<i64> {
    let mut ids: Vec<i64> = Vec::with_capacity(self.items.len());
    for line in &self.items {
      if !ids.contains(&line.product_id) {
        ids.push(line.product_id);
      }
    }
    ids
  }
}

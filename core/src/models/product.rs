// core/src/models/product.rs

use serde::Serialize;
use sqlx::FromRow;

/// The only product columns the order path reads.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Product {
  pub id: i64,
  pub price: f64,
}

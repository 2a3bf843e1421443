// core/src/models/report.rs

use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct UserSpend {
  pub user_id: i64,
  pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductSales {
  pub product_id: i64,
  pub quantity: f64,
}

// server/src/web/handlers/mod.rs
pub mod mirror_handlers;
pub mod order_handlers;
pub mod report_handlers;

use serde::Deserialize;

/// `?limit=` on list and report endpoints.
#[derive(Deserialize, Debug, Default)]
pub struct LimitQuery {
  pub limit: Option<usize>,
}

impl LimitQuery {
  pub fn resolve(&self, default: usize) -> usize {
    self.limit.unwrap_or(default)
  }
}

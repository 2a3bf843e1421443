// core/src/models/mirror_record.rs

//! The denormalized per-order projection kept in the mirror.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::collections::HashMap;

use super::order::{Order, OrderSummary};
use crate::error::MirrorError;

pub const FIELD_ID: &str = "id";
pub const FIELD_USER_ID: &str = "user_id";
pub const FIELD_TOTAL: &str = "total";
pub const FIELD_CREATED_AT: &str = "created_at";

/// Typed view of the `order:<id>` field map.
///
/// Every field but `id` may be absent; absent values are stored as empty strings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MirrorRecord {
  pub id: i64,
  pub user_id: Option<i64>,
  pub total: Option<f64>,
  pub created_at: Option<DateTime<Utc>>,
}

impl MirrorRecord {
  pub fn from_order(order: &Order) -> Self {
    MirrorRecord {
      id: order.id,
      user_id: Some(order.user_id),
      total: Some(order.total_amount),
      created_at: Some(order.created_at),
    }
  }

  pub fn from_summary(summary: &OrderSummary) -> Self {
    MirrorRecord {
      id: summary.id,
      user_id: summary.user_id,
      total: summary.total,
      created_at: summary.created_at,
    }
  }

  /// Encodes the record as the string field map written to the mirror.
  pub fn to_fields(&self) -> Vec<(&'static str, String)> {
    vec![
      (FIELD_ID, self.id.to_string()),
      (FIELD_USER_ID, self.user_id.map(|v| v.to_string()).unwrap_or_default()),
      (FIELD_TOTAL, self.total.map(|v| v.to_string()).unwrap_or_default()),
      (
        FIELD_CREATED_AT,
        self
          .created_at
          .map(|v| v.to_rfc3339_opts(SecondsFormat::Micros, true))
          .unwrap_or_default(),
      ),
    ]
  }

  /// Decodes a field map read back from `key`.
  pub fn from_fields(key: &str, fields: &HashMap<String, String>) -> Result<Self, MirrorError> {
    let corrupt = |reason: String| MirrorError::Corrupt {
      key: key.to_string(),
      reason,
    };
    let present = |name: &str| fields.get(name).map(|v| v.trim()).filter(|v| !v.is_empty());

    let id = present(FIELD_ID)
      .ok_or_else(|| corrupt("missing id".to_string()))?
      .parse::<i64>()
      .map_err(|e| corrupt(format!("bad id: {}", e)))?;
    let user_id = present(FIELD_USER_ID)
      .map(|v| v.parse::<i64>())
      .transpose()
      .map_err(|e| corrupt(format!("bad user_id: {}", e)))?;
    let total = present(FIELD_TOTAL)
      .map(|v| v.parse::<f64>())
      .transpose()
      .map_err(|e| corrupt(format!("bad total: {}", e)))?;
    let created_at = present(FIELD_CREATED_AT)
      .map(DateTime::parse_from_rfc3339)
      .transpose()
      .map_err(|e| corrupt(format!("bad created_at: {}", e)))?
      .map(|v| v.with_timezone(&Utc));

    Ok(MirrorRecord {
      id,
      user_id,
      total,
      created_at,
    })
  }
}

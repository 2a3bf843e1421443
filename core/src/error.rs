// core/src/error.rs
use thiserror::Error;

/// Failures of the relational system of record.
#[derive(Debug, Error)]
pub enum StoreError {
  #[error("Database error: {0}")]
  Database(#[from] sqlx::Error),

  /// Raised by stores that are not backed by sqlx.
  #[error("Store backend error: {0}")]
  Backend(String),
}

/// Failures of the cache mirror. These never undo a relational outcome.
#[derive(Debug, Error)]
pub enum MirrorError {
  #[error("Redis error: {0}")]
  Redis(#[from] redis::RedisError),

  #[error("Mirror encoding error: {0}")]
  Encoding(#[from] serde_json::Error),

  #[error("Corrupt mirror entry '{key}': {reason}")]
  Corrupt { key: String, reason: String },

  #[error("Mirror backend error: {0}")]
  Backend(String),
}

/// Why a backfill pass wrote nothing, or stopped early.
#[derive(Debug, Error)]
pub enum SyncError {
  #[error("Aggregate read from the store failed: {0}")]
  Store(#[from] StoreError),

  #[error("Mirror rejected the backfill: {0}")]
  Mirror(#[from] MirrorError),
}

/// Error returned by the order services.
#[derive(Debug, Error)]
pub enum OrderError {
  /// Rejected input. Always raised before any durable write.
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Persistence Error: {0}")]
  Persistence(#[from] StoreError),

  /// Only surfaced by read paths that have no relational fallback.
  #[error("Mirror Error: {0}")]
  Mirror(#[from] MirrorError),

  #[error("Internal Error: {0}")]
  Internal(String),
}

impl OrderError {
  pub fn validation(message: impl Into<String>) -> Self {
    OrderError::Validation(message.into())
  }

  pub fn is_validation(&self) -> bool {
    matches!(self, OrderError::Validation(_))
  }
}

pub type Result<T, E = OrderError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn store_errors_convert_into_persistence_failures() {
    let err: OrderError = StoreError::Backend("connection reset".to_string()).into();
    assert!(matches!(err, OrderError::Persistence(_)));
    assert!(!err.is_validation());
    assert_eq!(
      err.to_string(),
      "Persistence Error: Store backend error: connection reset"
    );
  }

  #[test]
  fn validation_message_is_kept_verbatim() {
    let err = OrderError::validation("quantity must be positive");
    assert!(err.is_validation());
    assert_eq!(err.to_string(), "Validation Error: quantity must be positive");
  }
}

// core/src/service/backfill.rs

//! One-shot repopulation of an empty mirror from the system of record.
//!
//! This is not a reconciliation pass: a mirror that holds any `order:*` key
//! is left alone, so partial or stale mirrors are not repaired here.

use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

use super::DRIFT_TARGET;
use crate::error::SyncError;
use crate::mirror::MirrorStore;
use crate::models::MirrorRecord;
use crate::store::OrderStore;

/// What a call to [`BackfillService::sync`] did.
#[derive(Debug, Default)]
pub struct SyncReport {
  /// False when the mirror was already populated or could not be inspected.
  pub attempted: bool,
  /// Records written by this call.
  pub written: usize,
  /// Records already present when the call found the mirror populated.
  pub existing: usize,
  pub error: Option<SyncError>,
}

impl SyncReport {
  fn skipped(existing: usize) -> Self {
    SyncReport {
      existing,
      ..Default::default()
    }
  }

  pub fn is_ok(&self) -> bool {
    self.error.is_none()
  }

  /// Records written, or records found when the pass was skipped.
  pub fn count(&self) -> usize {
    if self.attempted {
      self.written
    } else {
      self.existing
    }
  }
}

#[derive(Clone)]
pub struct BackfillService {
  store: Arc<dyn OrderStore>,
  mirror: Arc<dyn MirrorStore>,
}

impl BackfillService {
  pub fn new(store: Arc<dyn OrderStore>, mirror: Arc<dyn MirrorStore>) -> Self {
    Self { store, mirror }
  }

  /// Populates the mirror from one aggregate read, if the mirror is empty.
  ///
  /// Only field maps and id set memberships are written. Item blobs and sales
  /// counters are not rebuilt. Failures never propagate; they are logged and
  /// carried in the report.
  #[instrument(name = "BackfillService::sync", skip(self))]
  pub async fn sync(&self) -> SyncReport {
    match self.mirror.is_empty().await {
      Ok(true) => {}
      Ok(false) => {
        return match self.mirror.order_count().await {
          Ok(existing) => {
            info!(existing, "Mirror already populated, skipping backfill.");
            SyncReport::skipped(existing)
          }
          Err(e) => {
            warn!(target: DRIFT_TARGET, error = %e, "Mirror populated but its records could not be counted.");
            SyncReport {
              error: Some(e.into()),
              ..Default::default()
            }
          }
        };
      }
      Err(e) => {
        warn!(target: DRIFT_TARGET, error = %e, "Could not inspect the mirror, backfill not attempted.");
        return SyncReport {
          error: Some(e.into()),
          ..Default::default()
        };
      }
    }

    let summaries = match self.store.order_summaries().await {
      Ok(rows) => rows,
      Err(e) => {
        error!(target: DRIFT_TARGET, error = %e, "Backfill aggregate read failed.");
        return SyncReport {
          attempted: true,
          error: Some(e.into()),
          ..Default::default()
        };
      }
    };

    let mut written = 0;
    for summary in &summaries {
      let record = MirrorRecord::from_summary(summary);
      if let Err(e) = self.mirror.publish(&record).await {
        warn!(target: DRIFT_TARGET, order_id = record.id, written, error = %e, "Backfill stopped early.");
        return SyncReport {
          attempted: true,
          written,
          error: Some(e.into()),
          ..Default::default()
        };
      }
      written += 1;
      debug!(order_id = record.id, "Backfilled mirror record.");
    }

    info!(written, "Mirror backfill complete.");
    SyncReport {
      attempted: true,
      written,
      ..Default::default()
    }
  }
}

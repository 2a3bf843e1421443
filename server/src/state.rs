// server/src/state.rs
use crate::config::AppConfig;
use ordermirror::{BackfillService, MirrorStore, OrderStore, OrderWriteService, ReportQueryService};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
  pub writer: OrderWriteService,
  pub backfill: BackfillService,
  pub reports: ReportQueryService,
  pub config: Arc<AppConfig>, // Share loaded config
}

impl AppState {
  /// Wires every service to the same store and mirror handles.
  pub fn new(store: Arc<dyn OrderStore>, mirror: Arc<dyn MirrorStore>, config: Arc<AppConfig>) -> Self {
    Self {
      writer: OrderWriteService::new(store.clone(), mirror.clone()),
      backfill: BackfillService::new(store.clone(), mirror.clone()),
      reports: ReportQueryService::new(store, mirror),
      config,
    }
  }
}

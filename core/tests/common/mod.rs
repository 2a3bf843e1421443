// tests/common/mod.rs
#![allow(dead_code)] // Not every test file uses every helper

use once_cell::sync::Lazy;
use ordermirror::{
  BackfillService, MemoryMirror, MemoryOrderStore, OrderLine, OrderRequest, OrderWriteService, ReportQueryService,
};
use std::sync::Arc;
use tracing::Level;

// --- Catalogue used by every test ---
pub const WIDGET: i64 = 1; // 9.99
pub const GADGET: i64 = 2; // 4.50
pub const GIZMO: i64 = 3; // 20.00

pub const ALICE: i64 = 42;
pub const BOB: i64 = 7;

/// Services wired to in-process stores, with direct handles on both stores
/// for assertions and fault injection.
pub struct Harness {
  pub store: Arc<MemoryOrderStore>,
  pub mirror: Arc<MemoryMirror>,
  pub writer: OrderWriteService,
  pub backfill: BackfillService,
  pub reports: ReportQueryService,
}

pub fn harness() -> Harness {
  setup_tracing();
  let store = Arc::new(
    MemoryOrderStore::new()
      .with_product(WIDGET, 9.99)
      .with_product(GADGET, 4.5)
      .with_product(GIZMO, 20.0)
      .with_user(ALICE, "Alice")
      .with_user(BOB, "Bob"),
  );
  let mirror = Arc::new(MemoryMirror::new());
  Harness {
    writer: OrderWriteService::new(store.clone(), mirror.clone()),
    backfill: BackfillService::new(store.clone(), mirror.clone()),
    reports: ReportQueryService::new(store.clone(), mirror.clone()),
    store,
    mirror,
  }
}

pub fn request(user_id: i64, lines: &[(i64, f64)]) -> OrderRequest {
  OrderRequest::new(
    user_id,
    lines.iter().map(|&(product_id, quantity)| OrderLine::new(product_id, quantity)).collect(),
  )
}

// --- Helper for Tracing Setup (call once per test run if needed) ---
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer() // Important for tests to capture output
    .try_init()
    .ok(); // Allow multiple initializations in tests (ok if fails)
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

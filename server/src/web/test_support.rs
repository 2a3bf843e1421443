// server/src/web/test_support.rs
// In-process wiring for handler tests: no database or Redis required.

use crate::config::AppConfig;
use crate::state::AppState;
use ordermirror::{MemoryMirror, MemoryOrderStore};
use std::sync::Arc;

pub const WIDGET: i64 = 1; // 9.99
pub const GADGET: i64 = 2; // 4.50
pub const ALICE: i64 = 42;
pub const BOB: i64 = 7;

pub struct TestApp {
  pub state: AppState,
  pub store: Arc<MemoryOrderStore>,
  pub mirror: Arc<MemoryMirror>,
}

pub fn test_config() -> AppConfig {
  AppConfig {
    server_host: "127.0.0.1".to_string(),
    server_port: 0,
    database_url: "postgres://unused".to_string(),
    redis_url: "redis://unused".to_string(),
    db_max_connections: 1,
    sync_on_startup: false,
    report_limit: 10,
  }
}

pub fn test_app() -> TestApp {
  let store = Arc::new(
    MemoryOrderStore::new()
      .with_product(WIDGET, 9.99)
      .with_product(GADGET, 4.5)
      .with_user(ALICE, "Alice")
      .with_user(BOB, "Bob"),
  );
  let mirror = Arc::new(MemoryMirror::new());
  let state = AppState::new(store.clone(), mirror.clone(), Arc::new(test_config()));
  TestApp { state, store, mirror }
}

/// Builds the full route table over `state`, as `main` does.
#[macro_export]
macro_rules! init_test_service {
  ($state:expr) => {
    actix_web::test::init_service(
      actix_web::App::new()
        .app_data(actix_web::web::Data::new($state.clone()))
        .configure($crate::web::routes::configure_app_routes),
    )
    .await
  };
}

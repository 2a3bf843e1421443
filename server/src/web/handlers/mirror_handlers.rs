// server/src/web/handlers/mirror_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::state::AppState;

/// Runs the backfill pass. Failures are reported in the body, never as an error status.
#[instrument(name = "handler::sync_mirror", skip(app_state))]
pub async fn sync_mirror_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let report = app_state.backfill.sync().await;

  match &report.error {
    Some(e) => warn!(written = report.written, error = %e, "Mirror sync stopped early."),
    None => info!(
      attempted = report.attempted,
      count = report.count(),
      "Mirror sync finished."
    ),
  }

  Ok(HttpResponse::Ok().json(json!({
      "attempted": report.attempted,
      "count": report.count(),
      "written": report.written,
      "existing": report.existing,
      "error": report.error.as_ref().map(|e| e.to_string()),
  })))
}

#[cfg(test)]
mod tests {
  use crate::web::test_support::{test_app, ALICE, WIDGET};
  use actix_web::test;
  use ordermirror::MirrorFault;
  use serde_json::{json, Value};

  #[actix_web::test]
  async fn sync_fills_an_empty_mirror_then_skips() {
    let app = test_app();
    let first = app.store.insert_untotalled_order(ALICE, &[(WIDGET, 2.0, 9.99)]);
    let second = app.store.insert_untotalled_order(ALICE, &[(WIDGET, 1.0, 9.99)]);
    let service = crate::init_test_service!(app.state);

    let req = test::TestRequest::post().uri("/api/v1/mirror/sync").to_request();
    let body: Value = test::call_and_read_body_json(&service, req).await;
    assert_eq!(body["attempted"], json!(true));
    assert_eq!(body["count"], json!(2));
    assert_eq!(body["error"], Value::Null);
    assert!(app.mirror.contains_record(first));
    assert!(app.mirror.contains_record(second));

    let writes = app.mirror.write_count();
    let req = test::TestRequest::post().uri("/api/v1/mirror/sync").to_request();
    let body: Value = test::call_and_read_body_json(&service, req).await;
    assert_eq!(body["attempted"], json!(false));
    assert_eq!(body["count"], json!(2));
    assert_eq!(app.mirror.write_count(), writes);
  }

  #[actix_web::test]
  async fn sync_failure_is_reported_in_the_body() {
    let app = test_app();
    app.store.insert_untotalled_order(ALICE, &[(WIDGET, 1.0, 9.99)]);
    app.mirror.fail(MirrorFault::Publish, true);
    let service = crate::init_test_service!(app.state);

    let req = test::TestRequest::post().uri("/api/v1/mirror/sync").to_request();
    let resp = test::call_service(&service, req).await;
    assert!(resp.status().is_success());
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["written"], json!(0));
    assert!(body["error"].is_string());
  }
}

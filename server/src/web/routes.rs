// server/src/web/routes.rs

use actix_web::web;

use crate::web::handlers::{mirror_handlers, order_handlers, report_handlers};

// Liveness only; the mirror is allowed to be down while the service is up.
async fn health_check_handler() -> actix_web::HttpResponse {
  actix_web::HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

// This function will be called in `main.rs` to configure services for the Actix App.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.service(
    web::scope("/api/v1") // Base path for API version 1
      .route("/health", web::get().to(health_check_handler))
      // Order writes and point reads
      .service(
        web::scope("/orders")
          .route("", web::post().to(order_handlers::create_order_handler))
          // Registered ahead of "/{order_id}" so "recent" is not parsed as an id
          .route("/recent", web::get().to(order_handlers::recent_orders_handler))
          .route("/{order_id}", web::get().to(order_handlers::get_order_handler))
          .route("/{order_id}", web::delete().to(order_handlers::delete_order_handler))
          .route(
            "/{order_id}/republish",
            web::post().to(order_handlers::republish_order_handler),
          ),
      )
      .service(web::scope("/mirror").route("/sync", web::post().to(mirror_handlers::sync_mirror_handler)))
      .service(
        web::scope("/reports")
          .route(
            "/highest-spenders",
            web::get().to(report_handlers::highest_spenders_handler),
          )
          .route("/best-sellers", web::get().to(report_handlers::best_sellers_handler)),
      ),
  );
}

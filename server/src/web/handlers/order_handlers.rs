// server/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use ordermirror::{CreateOutcome, DeleteOutcome, OrderRequest};
use serde_json::json;
use tracing::{info, instrument, warn};

use super::LimitQuery;
use crate::errors::AppError;
use crate::state::AppState;

#[instrument(name = "handler::create_order", skip(app_state, payload))]
pub async fn create_order_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<OrderRequest>,
) -> Result<HttpResponse, AppError> {
  let outcome = app_state.writer.create(&payload).await?;

  let message = match &outcome {
    CreateOutcome::Persisted { .. } => "Order created.",
    CreateOutcome::PersistedMirrorFailed { order_id, error } => {
      warn!(order_id, error = %error, "Order created but not mirrored.");
      "Order created; the mirror will catch up on republish."
    }
  };
  info!(order_id = outcome.order_id(), "Order created via API.");

  Ok(HttpResponse::Created().json(json!({
      "message": message,
      "order_id": outcome.order_id(),
      "mirrored": outcome.is_mirrored(),
  })))
}

#[instrument(name = "handler::delete_order", skip(app_state, path), fields(order_id = %path.as_ref()))]
pub async fn delete_order_handler(
  app_state: web::Data<AppState>,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  let order_id = path.into_inner();
  let outcome = app_state.writer.delete(order_id).await?;

  // An absent order is a normal answer: deleted=false, nothing touched.
  if let DeleteOutcome::NotFound = outcome {
    info!(order_id, "Delete requested for an order that does not exist.");
  }

  Ok(HttpResponse::Ok().json(json!({
      "deleted": outcome.deleted(),
      "mirrored": outcome.is_mirrored(),
  })))
}

#[instrument(name = "handler::republish_order", skip(app_state, path), fields(order_id = %path.as_ref()))]
pub async fn republish_order_handler(
  app_state: web::Data<AppState>,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  let republished = app_state.writer.republish(path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({ "republished": republished })))
}

/// Serves the mirrored record, not the relational row.
#[instrument(name = "handler::get_order", skip(app_state, path), fields(order_id = %path.as_ref()))]
pub async fn get_order_handler(
  app_state: web::Data<AppState>,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  let order_id = path.into_inner();
  match app_state.reports.order(order_id).await? {
    Some(record) => Ok(HttpResponse::Ok().json(json!({ "order": record }))),
    None => Err(AppError::NotFound(format!("Order with ID {} is not mirrored.", order_id))),
  }
}

#[instrument(name = "handler::recent_orders", skip(app_state, query))]
pub async fn recent_orders_handler(
  app_state: web::Data<AppState>,
  query: web::Query<LimitQuery>,
) -> Result<HttpResponse, AppError> {
  let limit = query.resolve(app_state.config.report_limit);
  let orders = app_state.reports.recent_orders(limit).await?;
  Ok(HttpResponse::Ok().json(json!({ "orders": orders })))
}

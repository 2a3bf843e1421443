// server/src/web/handlers/report_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::{info, instrument};

use super::LimitQuery;
use crate::errors::AppError;
use crate::state::AppState;

#[instrument(name = "handler::highest_spenders", skip(app_state, query))]
pub async fn highest_spenders_handler(
  app_state: web::Data<AppState>,
  query: web::Query<LimitQuery>,
) -> Result<HttpResponse, AppError> {
  let limit = query.resolve(app_state.config.report_limit);
  let spenders = app_state.reports.highest_spenders(limit).await?;
  info!("Ranked {} spenders.", spenders.len());
  Ok(HttpResponse::Ok().json(json!({ "spenders": spenders })))
}

#[instrument(name = "handler::best_sellers", skip(app_state, query))]
pub async fn best_sellers_handler(
  app_state: web::Data<AppState>,
  query: web::Query<LimitQuery>,
) -> Result<HttpResponse, AppError> {
  let limit = query.resolve(app_state.config.report_limit);
  let products = app_state.reports.best_sellers(limit).await?;
  Ok(HttpResponse::Ok().json(json!({ "products": products })))
}

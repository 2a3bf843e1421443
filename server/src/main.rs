// server/src/main.rs

// Declare modules for the application
mod config;
mod errors;
mod state;
mod web;

use crate::config::AppConfig;
use crate::state::AppState;

use actix_web::{web as actix_data, App, HttpServer}; // Renamed web to actix_data
use anyhow::Context;
use ordermirror::{PgOrderStore, RedisMirror};
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan; // For span events in tracing

fn init_tracing() {
  // LOG_FORMAT=json switches to machine-readable lines for log shippers
  let json = std::env::var("LOG_FORMAT").map(|v| v.eq_ignore_ascii_case("json")).unwrap_or(false);
  let builder = tracing_subscriber::fmt()
    .with_max_level(Level::INFO) // Default level
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env()) // Allow RUST_LOG override
    .with_span_events(FmtSpan::CLOSE); // Log when spans close, showing duration
  if json {
    builder.json().init();
  } else {
    builder.init();
  }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
  dotenvy::dotenv().ok();
  init_tracing();

  tracing::info!("Starting order mirror server...");

  let app_config = Arc::new(AppConfig::from_env().context("Failed to load application configuration")?);

  let store = Arc::new(
    PgOrderStore::connect(&app_config.database_url, app_config.db_max_connections)
      .await
      .context("Failed to connect to the database")?,
  );
  tracing::info!("Successfully connected to the database.");

  let mirror = Arc::new(RedisMirror::new(&app_config.redis_url).context("Invalid Redis URL")?);
  // Writes still succeed while the mirror is down, so an unreachable Redis is not fatal.
  match mirror.ping().await {
    Ok(()) => tracing::info!("Successfully connected to the order mirror."),
    Err(e) => tracing::warn!(error = %e, "Order mirror unreachable at startup; continuing without it."),
  }

  let app_state = AppState::new(store.clone(), mirror, app_config.clone());

  if app_config.sync_on_startup {
    let report = app_state.backfill.sync().await;
    match &report.error {
      Some(e) => tracing::warn!(written = report.written, error = %e, "Startup mirror sync incomplete."),
      None => tracing::info!(
        attempted = report.attempted,
        count = report.count(),
        "Startup mirror sync finished."
      ),
    }
  }

  let server_address = format!("{}:{}", app_config.server_host, app_config.server_port);
  tracing::info!("Attempting to bind server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone())) // Share AppState with handlers
      .wrap(tracing_actix_web::TracingLogger::default()) // Actix middleware for tracing requests
      .configure(web::routes::configure_app_routes)
  })
  .bind(&server_address)
  .with_context(|| format!("Failed to bind {}", server_address))?
  .run()
  .await
  .context("HTTP server terminated with an error")?;

  store.close().await;
  tracing::info!("Database pool closed, shutting down.");
  Ok(())
}

// server/src/config.rs

use crate::errors::{AppError, Result}; // Use AppError specific Result
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub database_url: String,
  pub redis_url: String,
  pub db_max_connections: u32,

  // Run the one-shot mirror backfill before serving requests
  pub sync_on_startup: bool,

  // Default `limit` for report endpoints when the query string has none
  pub report_limit: usize,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present

    let get_env = |var_name: &str| {
      env::var(var_name).map_err(|e| AppError::Config(format!("Missing environment variable '{}': {}", var_name, e)))
    };

    let server_host = get_env("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let server_port = parse_env("SERVER_PORT", "8080")?;
    let database_url = get_env("DATABASE_URL")?;
    let redis_url = get_env("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379/0".to_string());
    let db_max_connections = parse_env("DB_MAX_CONNECTIONS", "5")?;
    let sync_on_startup = parse_env("SYNC_ON_STARTUP", "true")?;
    let report_limit = parse_env("REPORT_LIMIT", "10")?;

    tracing::info!("Application configuration loaded successfully.");
    // database_url and redis_url can carry credentials; keep them out of the logs.
    tracing::debug!(
      server_host = %server_host,
      server_port,
      db_max_connections,
      sync_on_startup,
      report_limit,
      "Loaded config details"
    );

    Ok(Self {
      server_host,
      server_port,
      database_url,
      redis_url,
      db_max_connections,
      sync_on_startup,
      report_limit,
    })
  }
}

fn parse_env<T>(var_name: &str, default: &str) -> Result<T>
where
  T: FromStr,
  T::Err: std::fmt::Display,
{
  let raw = env::var(var_name).unwrap_or_else(|_| default.to_string());
  raw
    .trim()
    .parse::<T>()
    .map_err(|e| AppError::Config(format!("Invalid {} value '{}': {}", var_name, raw, e)))
}

#[cfg(test)]
mod tests {
  use super::*;
  use serial_test::serial;

  const VARS: [&str; 7] = [
    "SERVER_HOST",
    "SERVER_PORT",
    "DATABASE_URL",
    "REDIS_URL",
    "DB_MAX_CONNECTIONS",
    "SYNC_ON_STARTUP",
    "REPORT_LIMIT",
  ];

  fn clear_env() {
    for var in VARS {
      env::remove_var(var);
    }
  }

  #[test]
  #[serial]
  fn defaults_apply_when_only_the_database_url_is_set() {
    clear_env();
    env::set_var("DATABASE_URL", "postgres://localhost/orders");

    let config = AppConfig::from_env().unwrap();
    assert_eq!(config.server_host, "127.0.0.1");
    assert_eq!(config.server_port, 8080);
    assert_eq!(config.redis_url, "redis://127.0.0.1:6379/0");
    assert_eq!(config.db_max_connections, 5);
    assert!(config.sync_on_startup);
    assert_eq!(config.report_limit, 10);
    clear_env();
  }

  #[test]
  #[serial]
  fn missing_database_url_is_a_config_error() {
    clear_env();
    match AppConfig::from_env() {
      Err(AppError::Config(message)) => assert!(message.contains("DATABASE_URL")),
      other => panic!("Expected config error, got {:?}", other.map(|_| ())),
    }
  }

  #[test]
  #[serial]
  fn malformed_values_are_rejected() {
    clear_env();
    env::set_var("DATABASE_URL", "postgres://localhost/orders");
    env::set_var("SERVER_PORT", "eighty");
    assert!(matches!(AppConfig::from_env(), Err(AppError::Config(m)) if m.contains("SERVER_PORT")));

    env::set_var("SERVER_PORT", "9000");
    env::set_var("SYNC_ON_STARTUP", "sometimes");
    assert!(matches!(AppConfig::from_env(), Err(AppError::Config(m)) if m.contains("SYNC_ON_STARTUP")));

    env::set_var("SYNC_ON_STARTUP", "false");
    let config = AppConfig::from_env().unwrap();
    assert_eq!(config.server_port, 9000);
    assert!(!config.sync_on_startup);
    clear_env();
  }
}

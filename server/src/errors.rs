// server/src/errors.rs

use actix_web::{HttpResponse, ResponseError};
use ordermirror::OrderError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  // Validation, persistence and mirror failures from the order services
  #[error(transparent)]
  Order(#[from] OrderError),
}

impl ResponseError for AppError {
  fn error_response(&self) -> HttpResponse {
    // Log the full error when it's turned into a response
    tracing::error!(application_error = %self, "Responding with error");
    match self {
      AppError::Config(m) => {
        HttpResponse::InternalServerError().json(json!({"error": "Configuration issue", "detail": m}))
      }
      AppError::NotFound(m) => HttpResponse::NotFound().json(json!({"error": m})),
      AppError::Order(OrderError::Validation(m)) => HttpResponse::BadRequest().json(json!({"error": m})),
      AppError::Order(OrderError::Persistence(_)) => {
        HttpResponse::InternalServerError().json(json!({"error": "Database operation failed"}))
      }
      AppError::Order(OrderError::Mirror(e)) => {
        HttpResponse::ServiceUnavailable().json(json!({"error": "Order mirror unavailable", "detail": e.to_string()}))
      }
      AppError::Order(OrderError::Internal(m)) => {
        HttpResponse::InternalServerError().json(json!({"error": "An internal error occurred", "detail": m}))
      }
    }
  }
}

// Define a Result type alias for the application
pub type Result<T, E = AppError> = std::result::Result<T, E>;

//! Error types for the deal service

use axum::{
  Json,
  extract::rejection::JsonRejection,
  http::StatusCode,
  response::{IntoResponse, Response},
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("Database error: {0}")]
  Database(#[from] sea_orm::DbErr),

  #[error("{0}")]
  Validation(&'static str),

  /// Body that is not a JSON object of the expected shape
  #[error("{}", .0.body_text())]
  Body(#[from] JsonRejection),

  #[error("Deal not found")]
  DealNotFound,
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let status = match &self {
      Error::Validation(_) | Error::Body(_) => StatusCode::BAD_REQUEST,
      Error::DealNotFound => StatusCode::NOT_FOUND,
      Error::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() {
      tracing::error!("{self}");
    }

    let body = json::json!({ "error": self.to_string() });
    (status, Json(body)).into_response()
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

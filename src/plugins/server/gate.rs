//! Shared-secret basic auth in front of the admin paths.

use std::sync::Arc;

use axum::{
  extract::{Query, Request, State},
  http::{HeaderMap, HeaderValue, Method, StatusCode, Uri, header},
  middleware::Next,
  response::{IntoResponse, Response},
};
use base64::{Engine, engine::general_purpose::STANDARD};

use crate::{model::ListQuery, prelude::*, state::AppState};

const PROTECTED: [&str; 2] = ["/admin", "/api/deals"];
const CHALLENGE: &str = r#"Basic realm="Admin""#;

#[derive(Debug, PartialEq, Eq)]
pub enum Denied {
  /// No `Basic` credential at all
  Missing,
  /// Credential that is not valid base64 text
  Malformed,
  Mismatch,
}

impl IntoResponse for Denied {
  fn into_response(self) -> Response {
    let challenge = [(header::WWW_AUTHENTICATE, CHALLENGE)];

    match self {
      Denied::Missing => {
        (StatusCode::UNAUTHORIZED, challenge, "Auth required").into_response()
      }
      Denied::Malformed => {
        (StatusCode::BAD_REQUEST, "Invalid auth header").into_response()
      }
      Denied::Mismatch => {
        (StatusCode::UNAUTHORIZED, challenge, "Unauthorized").into_response()
      }
    }
  }
}

/// `/admin`, `/api/deals` and everything below them.
pub fn is_protected(path: &str) -> bool {
  PROTECTED.iter().any(|prefix| {
    path
      .strip_prefix(prefix)
      .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
  })
}

/// The published list feeds the public listing and stays readable.
fn is_public_read(method: &Method, uri: &Uri) -> bool {
  *method == Method::GET
    && uri.path() == "/api/deals"
    && Query::<ListQuery>::try_from_uri(uri)
      .is_ok_and(|Query(query)| query.published_only())
}

/// Validates an `Authorization` header against `secret`. Any username is
/// accepted, only the password is compared.
pub fn check(
  authorization: Option<&HeaderValue>,
  secret: Option<&str>,
) -> Result<(), Denied> {
  let Some(value) = authorization else {
    return Err(Denied::Missing);
  };
  let value = value.to_str().map_err(|_| Denied::Malformed)?;
  let Some(encoded) = value.strip_prefix("Basic ") else {
    return Err(Denied::Missing);
  };

  let decoded = STANDARD.decode(encoded.trim()).map_err(|_| Denied::Malformed)?;
  let decoded = String::from_utf8(decoded).map_err(|_| Denied::Malformed)?;
  let password = decoded.split_once(':').map_or("", |(_, password)| password);

  match secret {
    Some(secret) if password == secret => Ok(()),
    _ => Err(Denied::Mismatch),
  }
}

pub async fn require_admin(
  State(app): State<Arc<AppState>>,
  req: Request,
  next: Next,
) -> Response {
  if !is_protected(req.uri().path()) || is_public_read(req.method(), req.uri())
  {
    return next.run(req).await;
  }

  let headers: &HeaderMap = req.headers();
  match check(
    headers.get(header::AUTHORIZATION),
    app.config.admin_password.as_deref(),
  ) {
    Ok(()) => next.run(req).await,
    Err(denied) => {
      warn!("Rejected {} {}: {denied:?}", req.method(), req.uri().path());
      denied.into_response()
    }
  }
}

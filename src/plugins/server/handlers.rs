use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State, rejection::JsonRejection},
  http::StatusCode,
};
use serde::Deserialize;

use crate::{
  catalog::Offer,
  entity::deal,
  model::{Data, DealPatch, ListQuery, NewDeal},
  prelude::*,
  state::AppState,
};

pub async fn health() -> &'static str {
  "OK"
}

pub async fn list_deals(
  State(app): State<Arc<AppState>>,
  Query(query): Query<ListQuery>,
) -> Result<Json<Data<Vec<deal::Model>>>> {
  let data = app.sv().deal.list(query.published_only()).await?;
  Ok(Json(Data { data }))
}

pub async fn create_deal(
  State(app): State<Arc<AppState>>,
  body: Result<Json<NewDeal>, JsonRejection>,
) -> Result<(StatusCode, Json<Data<deal::Model>>)> {
  let Json(new) = body?;
  let data = app.sv().deal.create(new).await?;
  Ok((StatusCode::CREATED, Json(Data { data })))
}

pub async fn update_deal(
  State(app): State<Arc<AppState>>,
  Path(id): Path<String>,
  body: Result<Json<DealPatch>, JsonRejection>,
) -> Result<Json<Data<deal::Model>>> {
  let Json(patch) = body?;
  let data = app.sv().deal.update(&id, patch).await?;
  Ok(Json(Data { data }))
}

pub async fn delete_deal(
  State(app): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Json<json::Value>> {
  app.sv().deal.delete(&id).await?;
  Ok(Json(json::json!({ "ok": true })))
}

#[derive(Debug, Deserialize)]
pub struct CouponsQuery {
  pub q: Option<String>,
}

/// Always answers `200`, an upstream failure is just an empty list.
pub async fn coupons(
  State(app): State<Arc<AppState>>,
  Query(query): Query<CouponsQuery>,
) -> Json<Vec<Offer>> {
  Json(app.paapi.search(query.q.as_deref()).await)
}

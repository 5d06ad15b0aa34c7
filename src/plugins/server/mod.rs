mod gate;
mod handlers;
mod pages;

use std::{net::SocketAddr, sync::Arc};

use axum::{
  Router,
  middleware::from_fn_with_state,
  routing::{get, patch},
};
use tower::ServiceBuilder;
use tower_governor::{GovernorLayer, governor::GovernorConfigBuilder};
use tower_http::{
  cors::{Any, CorsLayer},
  trace::TraceLayer,
};

use crate::{prelude::*, state::AppState};

/// Every route behind the admin gate, tracing and CORS.
pub fn router(app: Arc<AppState>) -> Router {
  Router::new()
    .route("/", get(pages::catalog))
    .route("/admin", get(pages::admin))
    .route("/health", get(handlers::health))
    .route(
      "/api/deals",
      get(handlers::list_deals).post(handlers::create_deal),
    )
    .route(
      "/api/deals/{id}",
      patch(handlers::update_deal).delete(handlers::delete_deal),
    )
    .route("/api/coupons", get(handlers::coupons))
    .layer(from_fn_with_state(app.clone(), gate::require_admin))
    .layer(
      ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
        CorsLayer::new()
          .allow_origin(Any)
          .allow_methods(Any)
          .allow_headers(Any),
      ),
    )
    .with_state(app)
}

pub struct Plugin;

#[async_trait]
impl super::Plugin for Plugin {
  async fn start(&self, app: Arc<AppState>) -> anyhow::Result<()> {
    let governor_conf = Arc::new(
      GovernorConfigBuilder::default()
        .per_second(2)
        .burst_size(100)
        .finish()
        .context("Failed to build rate limiter config")?,
    );

    let limiter = governor_conf.limiter().clone();
    let addr = SocketAddr::from(([0, 0, 0, 0], app.config.port));

    let router = router(app)
      .layer(GovernorLayer::new(governor_conf))
      .into_make_service_with_connect_info::<SocketAddr>();

    let listener = tokio::net::TcpListener::bind(addr)
      .await
      .with_context(|| format!("Failed to bind {addr}"))?;
    info!("HTTP Server listening on {addr}");

    let limiter = async {
      loop {
        time::sleep(Duration::from_secs(60)).await;
        limiter.retain_recent();
      }
    };

    let server = async {
      axum::serve(listener, router).await.context("Axum server error")
    };

    tokio::select! {
      result = server => {
        match &result {
          Ok(_) => info!("Server stopped gracefully"),
          Err(err) => error!("Server stopped with error: {err}"),
        }
        result
      }
      _ = limiter => {
        error!("Rate limiter cleaner stopped unexpectedly!");
        Ok(())
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    response::Response,
  };
  use base64::{Engine, engine::general_purpose::STANDARD};
  use tower::ServiceExt;

  use super::*;
  use crate::state::tests::setup_test_app;

  const PASSWORD: &str = "s3cret";

  async fn app() -> Router {
    router(Arc::new(setup_test_app(PASSWORD).await))
  }

  fn auth(password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("admin:{password}")))
  }

  fn request(method: &str, uri: &str, body: Option<json::Value>) -> Request<Body> {
    let builder = Request::builder()
      .method(method)
      .uri(uri)
      .header(header::AUTHORIZATION, auth(PASSWORD));

    match body {
      Some(body) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    }
  }

  async fn send(app: &Router, req: Request<Body>) -> (StatusCode, json::Value) {
    let res: Response = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, json::from_slice(&bytes).unwrap_or(json::Value::Null))
  }

  fn ids(value: &json::Value) -> Vec<String> {
    value["data"]
      .as_array()
      .unwrap()
      .iter()
      .map(|d| d["id"].as_str().unwrap().to_string())
      .collect()
  }

  #[tokio::test]
  async fn test_deal_lifecycle() {
    let app = app().await;

    let (status, created) = send(
      &app,
      request(
        "POST",
        "/api/deals",
        Some(json::json!({ "title": "10% off", "dealUrl": "https://x.com" })),
      ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["data"]["published"], false);
    assert_eq!(created["data"]["deal_url"], "https://x.com");
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let (_, listed) =
      send(&app, request("GET", "/api/deals?published=true", None)).await;
    assert!(ids(&listed).is_empty());

    let (status, patched) = send(
      &app,
      request(
        "PATCH",
        &format!("/api/deals/{id}"),
        Some(json::json!({ "published": true })),
      ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["data"]["published"], true);
    assert_eq!(patched["data"]["title"], "10% off");

    let (_, listed) =
      send(&app, request("GET", "/api/deals?published=true", None)).await;
    assert_eq!(ids(&listed), [id.clone()]);

    let (status, deleted) =
      send(&app, request("DELETE", &format!("/api/deals/{id}"), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted, json::json!({ "ok": true }));

    for uri in ["/api/deals", "/api/deals?published=true"] {
      let (_, listed) = send(&app, request("GET", uri, None)).await;
      assert!(ids(&listed).is_empty());
    }

    // deleting again still succeeds
    let (status, _) =
      send(&app, request("DELETE", &format!("/api/deals/{id}"), None)).await;
    assert_eq!(status, StatusCode::OK);
  }

  #[tokio::test]
  async fn test_create_requires_fields() {
    let app = app().await;

    for body in [
      json::json!({ "title": "10% off" }),
      json::json!({ "dealUrl": "https://x.com" }),
      json::json!({ "title": "", "dealUrl": "https://x.com" }),
    ] {
      let (status, res) =
        send(&app, request("POST", "/api/deals", Some(body))).await;
      assert_eq!(status, StatusCode::BAD_REQUEST);
      assert_eq!(res["error"], "title and dealUrl are required");
    }
  }

  #[tokio::test]
  async fn test_bad_bodies_answer_json_errors() {
    let app = app().await;

    let wrong_type = request(
      "POST",
      "/api/deals",
      Some(json::json!({ "title": 5, "dealUrl": "x" })),
    );
    let no_content_type = Request::builder()
      .method("POST")
      .uri("/api/deals")
      .header(header::AUTHORIZATION, auth(PASSWORD))
      .body(Body::from(r#"{"title":"a","dealUrl":"b"}"#))
      .unwrap();
    let not_json = Request::builder()
      .method("PATCH")
      .uri("/api/deals/any")
      .header(header::AUTHORIZATION, auth(PASSWORD))
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from("not json"))
      .unwrap();

    for req in [wrong_type, no_content_type, not_json] {
      let (status, res) = send(&app, req).await;
      assert_eq!(status, StatusCode::BAD_REQUEST);
      assert!(res["error"].as_str().is_some_and(|e| !e.is_empty()));
    }
  }

  #[tokio::test]
  async fn test_patch_unknown_deal() {
    let app = app().await;

    let (status, res) = send(
      &app,
      request(
        "PATCH",
        "/api/deals/missing",
        Some(json::json!({ "published": true })),
      ),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(res["error"], "Deal not found");
  }

  #[tokio::test]
  async fn test_admin_requires_auth() {
    let app = app().await;

    let req = Request::get("/admin").body(Body::empty()).unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let challenge = res.headers()[header::WWW_AUTHENTICATE].to_str().unwrap();
    assert!(challenge.starts_with("Basic"));

    let req = Request::get("/admin")
      .header(header::AUTHORIZATION, auth("wrong"))
      .body(Body::empty())
      .unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(res.headers().contains_key(header::WWW_AUTHENTICATE));

    let req = Request::get("/admin")
      .header(header::AUTHORIZATION, "Basic !!not-base64!!")
      .body(Body::empty())
      .unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = app.oneshot(request("GET", "/admin", None)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
  }

  #[tokio::test]
  async fn test_deal_api_is_gated() {
    let app = app().await;

    for (method, uri) in [
      ("GET", "/api/deals"),
      ("POST", "/api/deals"),
      ("PATCH", "/api/deals/1"),
      ("DELETE", "/api/deals/1"),
    ] {
      let req =
        Request::builder().method(method).uri(uri).body(Body::empty()).unwrap();
      let res = app.clone().oneshot(req).await.unwrap();
      assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{method} {uri}");
    }

    let req = Request::get("/api/deals?published=true")
      .body(Body::empty())
      .unwrap();
    let (status, listed) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert!(ids(&listed).is_empty());
  }

  #[tokio::test]
  async fn test_public_pages_are_open() {
    let app = app().await;

    let req = Request::get("/").body(Body::empty()).unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let html = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    // no published deals yet, so the seed offers are shown
    assert!(String::from_utf8_lossy(&html).contains("NIKE10"));

    let req = Request::get("/?store=Adidas&q=frete").body(Body::empty()).unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    let html = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let html = String::from_utf8_lossy(&html);
    assert!(html.contains("Frete grátis acima de R$299"));
    assert!(!html.contains("NIKE10"));

    let req = Request::get("/api/coupons?q=iphone").body(Body::empty()).unwrap();
    let (status, offers) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(offers, json::json!([]));
  }
}

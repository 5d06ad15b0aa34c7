//! HTTP client for the deal API.

use reqwest::{RequestBuilder, Response, Url};
use serde::{Deserialize, de::DeserializeOwned};

use crate::{
  catalog::Offer,
  entity::deal,
  model::{Data, DealPatch, NewDeal},
};

/// Username sent with the admin password, the gate ignores it.
const USERNAME: &str = "admin";

#[derive(Debug, Deserialize)]
struct ApiError {
  error: String,
}

#[derive(Debug, Clone)]
pub struct DealsClient {
  http: reqwest::Client,
  base: Url,
  password: Option<String>,
}

impl DealsClient {
  pub fn new(base: &str, password: Option<String>) -> anyhow::Result<Self> {
    let base = Url::parse(base)
      .map_err(|err| anyhow::anyhow!("Invalid server url `{base}`: {err}"))?;
    Ok(Self { http: reqwest::Client::new(), base, password })
  }

  fn endpoint(&self, segments: &[&str]) -> anyhow::Result<Url> {
    let mut url = self.base.clone();
    url
      .path_segments_mut()
      .map_err(|()| anyhow::anyhow!("Server url cannot be a base"))?
      .pop_if_empty()
      .extend(segments);
    Ok(url)
  }

  fn authed(&self, req: RequestBuilder) -> RequestBuilder {
    match &self.password {
      Some(password) => req.basic_auth(USERNAME, Some(password)),
      None => req,
    }
  }

  async fn read<T: DeserializeOwned>(res: Response) -> anyhow::Result<T> {
    let status = res.status();
    if status.is_success() {
      return Ok(res.json().await?);
    }

    let text = res.text().await.unwrap_or_default();
    let message = json::from_str::<ApiError>(&text)
      .map(|err| err.error)
      .unwrap_or(text);
    anyhow::bail!("Server answered {status}: {message}")
  }

  pub async fn list(&self, published_only: bool) -> anyhow::Result<Vec<deal::Model>> {
    let mut req = self.http.get(self.endpoint(&["api", "deals"])?);
    if published_only {
      req = req.query(&[("published", "true")]);
    }

    let res = self.authed(req).send().await?;
    Ok(Self::read::<Data<_>>(res).await?.data)
  }

  pub async fn create(&self, new: &NewDeal) -> anyhow::Result<deal::Model> {
    let req = self.http.post(self.endpoint(&["api", "deals"])?).json(new);
    let res = self.authed(req).send().await?;
    Ok(Self::read::<Data<_>>(res).await?.data)
  }

  pub async fn update(
    &self,
    id: &str,
    patch: &DealPatch,
  ) -> anyhow::Result<deal::Model> {
    let req = self.http.patch(self.endpoint(&["api", "deals", id])?).json(patch);
    let res = self.authed(req).send().await?;
    Ok(Self::read::<Data<_>>(res).await?.data)
  }

  pub async fn delete(&self, id: &str) -> anyhow::Result<()> {
    let req = self.http.delete(self.endpoint(&["api", "deals", id])?);
    let res = self.authed(req).send().await?;
    Self::read::<json::Value>(res).await?;
    Ok(())
  }

  pub async fn coupons(&self, query: Option<&str>) -> anyhow::Result<Vec<Offer>> {
    let mut req = self.http.get(self.endpoint(&["api", "coupons"])?);
    if let Some(query) = query {
      req = req.query(&[("q", query)]);
    }
    Self::read(req.send().await?).await
  }
}

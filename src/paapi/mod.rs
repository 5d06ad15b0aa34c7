//! Amazon Product Advertising API 5.0 offer provider.
//!
//! Failures never reach the caller: any error while searching is logged and
//! turned into an empty offer list.

mod model;
mod sign;

use std::fmt;

use reqwest::Url;

use self::{
  model::{RESOURCES, SearchItemsRequest, SearchItemsResponse},
  sign::{Headers, Signer},
};
use crate::{catalog::Offer, prelude::*, state::var};

pub const DEFAULT_KEYWORDS: &str = "Nike OR Adidas OR iPhone OR Insider";
const PATH: &str = "/paapi5/searchitems";
const SERVICE: &str = "ProductAdvertisingAPI";
const TARGET: &str = "com.amazon.paapi5.v1.ProductAdvertisingAPIv1.SearchItems";
const ITEM_COUNT: u32 = 10;

#[derive(Clone)]
pub struct Config {
  /// Signing region, Brazil signs with `us-east-1`
  pub region: String,
  /// Host name, optionally with a scheme (`https` when omitted)
  pub endpoint: String,
  pub marketplace: String,
  pub partner_tag: Option<String>,
  pub access_key: Option<String>,
  pub secret_key: Option<String>,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      region: String::from("us-east-1"),
      endpoint: String::from("webservices.amazon.com.br"),
      marketplace: String::from("www.amazon.com.br"),
      partner_tag: None,
      access_key: None,
      secret_key: None,
    }
  }
}

impl fmt::Debug for Config {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Config")
      .field("region", &self.region)
      .field("endpoint", &self.endpoint)
      .field("marketplace", &self.marketplace)
      .field("partner_tag", &self.partner_tag)
      .field("access_key", &utils::mask(self.access_key.as_deref()))
      .field("secret_key", &utils::mask(self.secret_key.as_deref()))
      .finish()
  }
}

impl Config {
  pub fn from_env() -> Self {
    let default = Self::default();

    Self {
      region: var("AMZ_REGION").unwrap_or(default.region),
      endpoint: var("AMZ_ENDPOINT").unwrap_or(default.endpoint),
      marketplace: var("AMZ_MARKETPLACE").unwrap_or(default.marketplace),
      partner_tag: var("AMZ_ASSOCIATE_TAG"),
      access_key: var("AMZ_ACCESS_KEY_ID"),
      secret_key: var("AMZ_SECRET_ACCESS_KEY"),
    }
  }

  fn url(&self) -> anyhow::Result<Url> {
    let base = if self.endpoint.contains("://") {
      self.endpoint.clone()
    } else {
      format!("https://{}", self.endpoint)
    };

    let mut url = Url::parse(&base)
      .with_context(|| format!("Invalid PA-API endpoint `{}`", self.endpoint))?;
    url.set_path(PATH);
    Ok(url)
  }
}

pub struct Client {
  http: reqwest::Client,
  config: Config,
}

impl Client {
  pub fn new(config: Config) -> Self {
    Self { http: reqwest::Client::new(), config }
  }

  /// Searches for `query`, or the default keywords when it is blank.
  pub async fn search(&self, query: Option<&str>) -> Vec<Offer> {
    let keywords = query
      .map(str::trim)
      .filter(|q| !q.is_empty())
      .unwrap_or(DEFAULT_KEYWORDS);

    debug!(config = ?self.config, "Searching PA-API for `{keywords}`");

    match self.try_search(keywords).await {
      Ok(offers) => {
        debug!("PA-API returned {} offers", offers.len());
        offers
      }
      Err(err) => {
        error!("PA-API search failed: {err:#}");
        Vec::new()
      }
    }
  }

  fn payload<'a>(
    &'a self,
    keywords: &'a str,
    partner_tag: &'a str,
  ) -> SearchItemsRequest<'a> {
    SearchItemsRequest {
      keywords,
      search_index: "All",
      item_count: ITEM_COUNT,
      item_page: 1,
      partner_tag,
      partner_type: "Associates",
      marketplace: &self.config.marketplace,
      resources: &RESOURCES,
    }
  }

  async fn try_search(&self, keywords: &str) -> anyhow::Result<Vec<Offer>> {
    let config = &self.config;
    let (Some(access_key), Some(secret_key), Some(partner_tag)) = (
      config.access_key.as_deref(),
      config.secret_key.as_deref(),
      config.partner_tag.as_deref(),
    ) else {
      warn!("PA-API credentials or partner tag missing, skipping search");
      return Ok(Vec::new());
    };

    let url = config.url()?;
    let host = match (url.host_str(), url.port()) {
      (Some(host), Some(port)) => format!("{host}:{port}"),
      (Some(host), None) => host.to_string(),
      (None, _) => anyhow::bail!("PA-API endpoint has no host"),
    };
    let body = json::to_vec(&self.payload(keywords, partner_tag))?;

    let mut headers = Headers::from([
      ("content-encoding".to_string(), "amz-1.0".to_string()),
      (
        "content-type".to_string(),
        "application/json; charset=UTF-8".to_string(),
      ),
      ("host".to_string(), host),
      ("x-amz-target".to_string(), TARGET.to_string()),
    ]);

    Signer { access_key, secret_key, region: &config.region, service: SERVICE }
      .sign("POST", url.path(), &mut headers, &body, Utc::now());

    let mut req = self.http.post(url);
    for (name, value) in headers {
      req = req.header(name, value);
    }

    let res = req.body(body).send().await.context("PA-API request failed")?;

    let status = res.status();
    if !status.is_success() {
      let text = res.text().await.unwrap_or_default();
      anyhow::bail!("PA-API responded {status}: {text}");
    }

    let data: SearchItemsResponse =
      res.json().await.context("Malformed PA-API response")?;
    Ok(data.into_offers(Utc::now()))
  }
}

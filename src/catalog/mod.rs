//! Offers shown on the public listing and the pipeline that filters and
//! sorts them.
//!
//! Everything here is pure: a [`view`] is recomputed from the loaded offers,
//! the visitor's local usage counts and the current [`Filters`] every time
//! one of them changes.

pub mod seed;
pub mod usage;

use std::{fmt, str::FromStr};

use chrono::Utc;
use serde::{Deserialize, Serialize};

pub use self::usage::{UsageCounts, UsageStore};
use crate::entity::deal;

pub type Timestamp = chrono::DateTime<Utc>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Store {
  Nike,
  Adidas,
  #[serde(rename = "iShop")]
  IShop,
  #[serde(rename = "Insider Store")]
  InsiderStore,
  Amazon,
  #[serde(rename = "Outros")]
  Others,
}

impl Store {
  pub const ALL: [Store; 6] = [
    Store::Nike,
    Store::Adidas,
    Store::IShop,
    Store::InsiderStore,
    Store::Amazon,
    Store::Others,
  ];

  pub fn label(self) -> &'static str {
    match self {
      Store::Nike => "Nike",
      Store::Adidas => "Adidas",
      Store::IShop => "iShop",
      Store::InsiderStore => "Insider Store",
      Store::Amazon => "Amazon",
      Store::Others => "Outros",
    }
  }
}

impl fmt::Display for Store {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum StoreFilter {
  #[default]
  All,
  Only(Store),
}

impl FromStr for StoreFilter {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let s = s.trim();
    let all = ["", "all", "todas"];
    if all.iter().any(|label| label.eq_ignore_ascii_case(s)) {
      return Ok(StoreFilter::All);
    }

    Store::ALL
      .into_iter()
      .find(|store| store.label().eq_ignore_ascii_case(s))
      .map(StoreFilter::Only)
      .ok_or_else(|| format!("unknown store `{s}`"))
  }
}

impl TryFrom<String> for StoreFilter {
  type Error = String;

  fn try_from(value: String) -> Result<Self, Self::Error> {
    value.parse()
  }
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Sort {
  /// Most recently verified first
  #[default]
  Recent,
  /// Most used first
  Popular,
  /// Closest expiry first
  Expiring,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Filters {
  #[serde(rename = "q")]
  pub query: String,
  pub store: StoreFilter,
  pub sort: Sort,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
  pub id: String,
  pub store: Store,
  pub title: String,
  /// Empty for offers without a code
  #[serde(default)]
  pub code: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  pub url: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub expires_at: Option<Timestamp>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub verified_at: Option<Timestamp>,
  #[serde(default)]
  pub tags: Vec<String>,
  /// Base usage count supplied with the offer
  #[serde(default)]
  pub uses: u64,
}

impl Offer {
  pub fn has_code(&self) -> bool {
    !self.code.is_empty()
  }

  /// `query` must already be trimmed and lower-cased.
  pub fn matches(&self, query: &str) -> bool {
    let hit = |s: &str| s.to_lowercase().contains(query);

    hit(&self.title)
      || self.description.as_deref().is_some_and(hit)
      || self.tags.iter().any(|tag| hit(tag))
      || hit(self.store.label())
      || hit(&self.code)
  }
}

impl From<deal::Model> for Offer {
  fn from(deal: deal::Model) -> Self {
    let tag = if deal.coupon_code.is_some() { "Cupom" } else { "Oferta" };

    Self {
      id: deal.id,
      // deals carry no brand yet
      store: Store::Others,
      title: deal.title,
      code: deal.coupon_code.unwrap_or_default(),
      description: deal.subtitle,
      url: deal.deal_url,
      expires_at: None,
      verified_at: Some(deal.updated_at.and_utc()),
      tags: vec![tag.to_string()],
      uses: 0,
    }
  }
}

/// Offers for a freshly loaded deal list, or the seed offers when the deals
/// could not be loaded or there are none.
pub fn live_or_seed(deals: Option<Vec<deal::Model>>) -> Vec<Offer> {
  match deals {
    Some(deals) if !deals.is_empty() => {
      deals.into_iter().map(Offer::from).collect()
    }
    _ => seed::offers(Utc::now()),
  }
}

/// Applies local usage, the store and text filters, then the sort.
pub fn view(offers: &[Offer], usage: &UsageCounts, filters: &Filters) -> Vec<Offer> {
  let mut data: Vec<Offer> = offers
    .iter()
    .map(|offer| Offer {
      uses: offer.uses.saturating_add(usage.get(&offer.id)),
      ..offer.clone()
    })
    .collect();

  if let StoreFilter::Only(store) = filters.store {
    data.retain(|offer| offer.store == store);
  }

  let query = filters.query.trim().to_lowercase();
  if !query.is_empty() {
    data.retain(|offer| offer.matches(&query));
  }

  // `sort_by` is stable, ties keep their previous order
  match filters.sort {
    Sort::Popular => data.sort_by(|a, b| b.uses.cmp(&a.uses)),
    Sort::Expiring => {
      data.sort_by_key(|offer| (offer.expires_at.is_none(), offer.expires_at))
    }
    Sort::Recent => data.sort_by(|a, b| b.verified_at.cmp(&a.verified_at)),
  }

  data
}

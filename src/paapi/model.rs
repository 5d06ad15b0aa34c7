//! Wire types of the `SearchItems` operation.
//!
//! Only the fields turned into offers are decoded, all of them optional so a
//! partial item never fails the whole response.

use serde::{Deserialize, Serialize};

use crate::catalog::{Offer, Store, Timestamp};

pub const RESOURCES: [&str; 3] =
  ["Images.Primary.Large", "ItemInfo.Title", "Offers.Listings.Price"];

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SearchItemsRequest<'a> {
  pub keywords: &'a str,
  pub search_index: &'a str,
  pub item_count: u32,
  pub item_page: u32,
  pub partner_tag: &'a str,
  pub partner_type: &'a str,
  pub marketplace: &'a str,
  pub resources: &'a [&'a str],
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SearchItemsResponse {
  #[serde(default)]
  pub search_result: Option<SearchResult>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SearchResult {
  #[serde(default)]
  pub items: Vec<Item>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Item {
  #[serde(rename = "ASIN")]
  pub asin: Option<String>,
  #[serde(rename = "DetailPageURL")]
  pub detail_page_url: Option<String>,
  pub item_info: Option<ItemInfo>,
  pub offers: Option<Offers>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ItemInfo {
  pub title: Option<DisplayValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DisplayValue {
  pub display_value: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Offers {
  #[serde(default)]
  pub listings: Vec<Listing>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Listing {
  pub price: Option<Price>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Price {
  pub display_amount: Option<String>,
}

fn present(value: Option<String>) -> Option<String> {
  value.filter(|s| !s.trim().is_empty())
}

impl Item {
  /// Items without an ASIN, a title or a detail page are dropped.
  pub fn into_offer(self, now: Timestamp) -> Option<Offer> {
    let asin = present(self.asin)?;
    let title =
      present(self.item_info.and_then(|info| info.title?.display_value))?;
    let url = present(self.detail_page_url)?;

    let price = self
      .offers
      .and_then(|offers| offers.listings.into_iter().next())
      .and_then(|listing| listing.price?.display_amount);

    Some(Offer {
      id: format!("amz-{asin}"),
      store: Store::Amazon,
      title,
      code: String::new(),
      description: present(price).map(|price| format!("Preço: {price}")),
      url,
      expires_at: None,
      verified_at: Some(now),
      tags: vec!["Oferta".to_string()],
      uses: 0,
    })
  }
}

impl SearchItemsResponse {
  pub fn into_offers(self, now: Timestamp) -> Vec<Offer> {
    self
      .search_result
      .map(|result| result.items)
      .unwrap_or_default()
      .into_iter()
      .filter_map(|item| item.into_offer(now))
      .collect()
  }
}

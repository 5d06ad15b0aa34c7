use serde::{Deserialize, Deserializer, Serialize};

/// Body of `POST /api/deals`.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDeal {
  #[serde(default, deserialize_with = "null_as_empty")]
  pub title: String,
  #[serde(default, deserialize_with = "null_as_empty")]
  pub deal_url: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub coupon_code: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub subtitle: Option<String>,
}

/// Body of `PATCH /api/deals/{id}`.
///
/// Outer `None` leaves a field untouched, `Some(None)` (an explicit `null`)
/// clears an optional text field.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealPatch {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub title: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub deal_url: Option<String>,
  #[serde(
    default,
    deserialize_with = "nullable",
    skip_serializing_if = "Option::is_none"
  )]
  pub coupon_code: Option<Option<String>>,
  #[serde(
    default,
    deserialize_with = "nullable",
    skip_serializing_if = "Option::is_none"
  )]
  pub subtitle: Option<Option<String>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub published: Option<bool>,
}

impl DealPatch {
  pub fn published(published: bool) -> Self {
    Self { published: Some(published), ..Default::default() }
  }
}

fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
  D: Deserializer<'de>,
  T: Deserialize<'de>,
{
  Option::<T>::deserialize(deserializer).map(Some)
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
  D: Deserializer<'de>,
{
  Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Data<T> {
  pub data: T,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
  pub published: Option<String>,
}

impl ListQuery {
  pub fn published_only(&self) -> bool {
    self.published.as_deref() == Some("true")
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn patch_distinguishes_null_from_absent() {
    let patch: DealPatch =
      json::from_str(r#"{"couponCode": null, "published": true}"#).unwrap();

    assert_eq!(patch.coupon_code, Some(None));
    assert_eq!(patch.subtitle, None);
    assert_eq!(patch.title, None);
    assert_eq!(patch.published, Some(true));
  }

  #[test]
  fn patch_serializes_only_present_fields() {
    let patch = DealPatch { subtitle: Some(None), ..DealPatch::published(false) };
    let value = json::to_value(&patch).unwrap();

    assert_eq!(value, json::json!({ "subtitle": null, "published": false }));
  }

  #[test]
  fn new_deal_accepts_camel_case() {
    let deal: NewDeal =
      json::from_str(r#"{"title": "10% off", "dealUrl": "https://x.com"}"#)
        .unwrap();

    assert_eq!(deal.title, "10% off");
    assert_eq!(deal.deal_url, "https://x.com");
    assert!(deal.coupon_code.is_none());
  }

  #[test]
  fn new_deal_treats_null_required_fields_as_empty() {
    let deal: NewDeal =
      json::from_str(r#"{"title": null, "dealUrl": "https://x.com"}"#).unwrap();

    assert!(deal.title.is_empty());
  }
}

use uuid::Uuid;

use crate::{
  entity::deal,
  model::{DealPatch, NewDeal},
  prelude::*,
};

pub struct Deal<'a> {
  db: &'a DatabaseConnection,
}

/// Trims the value and drops it when nothing is left.
fn non_blank(value: Option<String>) -> Option<String> {
  value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn required(value: &str, message: &'static str) -> Result<String> {
  let value = value.trim();
  if value.is_empty() {
    return Err(Error::Validation(message));
  }
  Ok(value.to_string())
}

impl<'a> Deal<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn list(&self, published_only: bool) -> Result<Vec<deal::Model>> {
    let mut query =
      deal::Entity::find().order_by_desc(deal::Column::CreatedAt);

    if published_only {
      query = query.filter(deal::Column::Published.eq(true));
    }

    Ok(query.all(self.db).await?)
  }

  pub async fn by_id(&self, id: &str) -> Result<Option<deal::Model>> {
    Ok(deal::Entity::find_by_id(id).one(self.db).await?)
  }

  pub async fn create(&self, new: NewDeal) -> Result<deal::Model> {
    if new.title.trim().is_empty() || new.deal_url.trim().is_empty() {
      return Err(Error::Validation("title and dealUrl are required"));
    }

    let now = Utc::now().naive_utc();
    let deal = deal::ActiveModel {
      id: Set(Uuid::new_v4().to_string()),
      title: Set(new.title.trim().to_string()),
      deal_url: Set(new.deal_url.trim().to_string()),
      coupon_code: Set(non_blank(new.coupon_code)),
      subtitle: Set(non_blank(new.subtitle)),
      published: Set(false),
      created_at: Set(now),
      updated_at: Set(now),
    };

    let deal = deal.insert(self.db).await?;
    info!("Created draft deal {} ({})", deal.id, deal.title);
    Ok(deal)
  }

  pub async fn update(&self, id: &str, patch: DealPatch) -> Result<deal::Model> {
    let title = patch
      .title
      .as_deref()
      .map(|title| required(title, "title must not be empty"))
      .transpose()?;
    let deal_url = patch
      .deal_url
      .as_deref()
      .map(|url| required(url, "dealUrl must not be empty"))
      .transpose()?;

    let model = self.by_id(id).await?.ok_or(Error::DealNotFound)?;
    let mut deal: deal::ActiveModel = model.into();

    if let Some(title) = title {
      deal.title = Set(title);
    }
    if let Some(deal_url) = deal_url {
      deal.deal_url = Set(deal_url);
    }
    if let Some(code) = patch.coupon_code {
      deal.coupon_code = Set(non_blank(code));
    }
    if let Some(subtitle) = patch.subtitle {
      deal.subtitle = Set(non_blank(subtitle));
    }
    if let Some(published) = patch.published {
      deal.published = Set(published);
    }
    deal.updated_at = Set(Utc::now().naive_utc());

    Ok(deal.update(self.db).await?)
  }

  /// Deleting an unknown id is not an error.
  pub async fn delete(&self, id: &str) -> Result<()> {
    let res = deal::Entity::delete_by_id(id).exec(self.db).await?;
    if res.rows_affected == 0 {
      debug!("Deal {id} already gone, nothing to delete");
    } else {
      info!("Deleted deal {id}");
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::state::tests::setup_test_db;

  fn new_deal(title: &str, url: &str) -> NewDeal {
    NewDeal { title: title.into(), deal_url: url.into(), ..Default::default() }
  }

  #[tokio::test]
  async fn test_create_deal_is_draft() {
    let db = setup_test_db().await;

    let deal =
      Deal::new(&db).create(new_deal("10% off", "https://x.com")).await.unwrap();

    assert_eq!(deal.title, "10% off");
    assert_eq!(deal.deal_url, "https://x.com");
    assert!(!deal.published);
    assert!(deal.coupon_code.is_none());
    assert_eq!(deal.created_at, deal.updated_at);
  }

  #[tokio::test]
  async fn test_create_requires_title_and_url() {
    let db = setup_test_db().await;
    let sv = Deal::new(&db);

    for (title, url) in [("", "https://x.com"), ("10% off", ""), ("  ", " ")] {
      assert!(matches!(
        sv.create(new_deal(title, url)).await,
        Err(Error::Validation(_))
      ));
    }
    assert!(sv.list(false).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn test_create_drops_blank_optionals() {
    let db = setup_test_db().await;

    let deal = Deal::new(&db)
      .create(NewDeal {
        coupon_code: Some(String::new()),
        subtitle: Some("Frete grátis".into()),
        ..new_deal("Promo", "https://x.com")
      })
      .await
      .unwrap();

    assert_eq!(deal.coupon_code, None);
    assert_eq!(deal.subtitle.as_deref(), Some("Frete grátis"));
  }

  #[tokio::test]
  async fn test_partial_update_keeps_absent_fields() {
    let db = setup_test_db().await;
    let sv = Deal::new(&db);

    let deal = sv
      .create(NewDeal {
        coupon_code: Some("NIKE10".into()),
        subtitle: Some("Selected items".into()),
        ..new_deal("10% off", "https://x.com")
      })
      .await
      .unwrap();

    let updated = sv.update(&deal.id, DealPatch::published(true)).await.unwrap();

    assert!(updated.published);
    assert_eq!(updated.title, deal.title);
    assert_eq!(updated.deal_url, deal.deal_url);
    assert_eq!(updated.coupon_code, deal.coupon_code);
    assert_eq!(updated.subtitle, deal.subtitle);
    assert_eq!(updated.created_at, deal.created_at);
    assert!(updated.updated_at >= deal.updated_at);
  }

  #[tokio::test]
  async fn test_update_null_clears_optionals() {
    let db = setup_test_db().await;
    let sv = Deal::new(&db);

    let deal = sv
      .create(NewDeal {
        coupon_code: Some("NIKE10".into()),
        ..new_deal("10% off", "https://x.com")
      })
      .await
      .unwrap();

    let patch = DealPatch { coupon_code: Some(None), ..Default::default() };
    let updated = sv.update(&deal.id, patch).await.unwrap();

    assert_eq!(updated.coupon_code, None);
  }

  #[tokio::test]
  async fn test_update_rejects_empty_title() {
    let db = setup_test_db().await;
    let sv = Deal::new(&db);

    let deal = sv.create(new_deal("10% off", "https://x.com")).await.unwrap();
    let patch = DealPatch { title: Some(" ".into()), ..Default::default() };

    assert!(matches!(
      sv.update(&deal.id, patch).await,
      Err(Error::Validation(_))
    ));
    assert_eq!(sv.by_id(&deal.id).await.unwrap().unwrap().title, "10% off");
  }

  #[tokio::test]
  async fn test_update_unknown_deal() {
    let db = setup_test_db().await;

    assert!(matches!(
      Deal::new(&db).update("missing", DealPatch::published(true)).await,
      Err(Error::DealNotFound)
    ));
  }

  #[tokio::test]
  async fn test_published_filter_and_order() {
    let db = setup_test_db().await;
    let sv = Deal::new(&db);

    let first = sv.create(new_deal("first", "https://a.com")).await.unwrap();
    time::sleep(Duration::from_millis(10)).await;
    let second = sv.create(new_deal("second", "https://b.com")).await.unwrap();

    let all = sv.list(false).await.unwrap();
    let ids: Vec<_> = all.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, [second.id.as_str(), first.id.as_str()]);

    assert!(sv.list(true).await.unwrap().is_empty());

    sv.update(&first.id, DealPatch::published(true)).await.unwrap();
    let published = sv.list(true).await.unwrap();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].id, first.id);

    sv.update(&first.id, DealPatch::published(false)).await.unwrap();
    assert!(sv.list(true).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn test_delete_is_idempotent() {
    let db = setup_test_db().await;
    let sv = Deal::new(&db);

    let deal = sv.create(new_deal("10% off", "https://x.com")).await.unwrap();
    sv.update(&deal.id, DealPatch::published(true)).await.unwrap();

    sv.delete(&deal.id).await.unwrap();
    sv.delete(&deal.id).await.unwrap();

    assert!(sv.list(false).await.unwrap().is_empty());
    assert!(sv.list(true).await.unwrap().is_empty());
  }
}

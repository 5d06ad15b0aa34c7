//! Deal entity - a coupon or offer managed from the admin console

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "deals")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub id: String,
  pub title: String,
  pub deal_url: String,
  /// `None` means an offer without a code
  pub coupon_code: Option<String>,
  #[sea_orm(column_type = "Text", nullable)]
  pub subtitle: Option<String>,
  pub published: bool,
  pub created_at: DateTime,
  pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

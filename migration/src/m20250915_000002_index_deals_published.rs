use sea_orm_migration::prelude::*;

use super::m20250901_000001_create_deals::Deals;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_index(
        Index::create()
          .name("idx_deals_published_created")
          .table(Deals::Table)
          .col(Deals::Published)
          .col(Deals::CreatedAt)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_index(
        Index::drop()
          .name("idx_deals_published_created")
          .table(Deals::Table)
          .to_owned(),
      )
      .await
  }
}

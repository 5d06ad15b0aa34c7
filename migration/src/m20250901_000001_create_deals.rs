use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Deals::Table)
          .if_not_exists()
          .col(ColumnDef::new(Deals::Id).string().not_null().primary_key())
          .col(ColumnDef::new(Deals::Title).string().not_null())
          .col(ColumnDef::new(Deals::DealUrl).string().not_null())
          .col(ColumnDef::new(Deals::CouponCode).string().null())
          .col(ColumnDef::new(Deals::Subtitle).text().null())
          .col(
            ColumnDef::new(Deals::Published)
              .boolean()
              .not_null()
              .default(false),
          )
          .col(ColumnDef::new(Deals::CreatedAt).date_time().not_null())
          .col(ColumnDef::new(Deals::UpdatedAt).date_time().not_null())
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(Deals::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum Deals {
  Table,
  Id,
  Title,
  DealUrl,
  CouponCode,
  Subtitle,
  Published,
  CreatedAt,
  UpdatedAt,
}

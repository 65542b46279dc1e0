use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum CustomCategories {
    Table,
    Id,
    UserId,
    Name,
    Kind,
    CreatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CustomCategories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CustomCategories::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CustomCategories::UserId).blob().not_null())
                    .col(
                        ColumnDef::new(CustomCategories::Name)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CustomCategories::Kind)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CustomCategories::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-custom_categories-user_id")
                            .from(CustomCategories::Table, CustomCategories::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ux-custom_categories-user_id-name-kind")
                    .table(CustomCategories::Table)
                    .col(CustomCategories::UserId)
                    .col(CustomCategories::Name)
                    .col(CustomCategories::Kind)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CustomCategories::Table).to_owned())
            .await
    }
}

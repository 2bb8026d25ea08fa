use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Role and gender are stored as plain strings so the same schema
        // runs on postgres and the sqlite test database.
        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    .if_not_exists()
                    .col(uuid(User::Id).primary_key())
                    .col(string_len(User::Email, 255).not_null().unique_key())
                    .col(string_len(User::PasswordHash, 255).not_null())
                    .col(string_len_null(User::Name, 100))
                    .col(string_len_null(User::FullName, 100))
                    .col(string_len_null(User::Phone, 20))
                    .col(string_len(User::Gender, 10).not_null())
                    .col(date_null(User::DateOfBirth))
                    .col(json_null(User::Address))
                    .col(json_null(User::ProfileImage))
                    .col(json_null(User::ValidId))
                    .col(boolean(User::IsVerified).not_null().default(false))
                    .col(string_len(User::Role, 20).not_null())
                    .col(string_len_null(User::PasswordResetToken, 64))
                    .col(timestamp_with_time_zone_null(User::PasswordResetExpires))
                    .col(
                        timestamp_with_time_zone(User::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(User::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum User {
    Table,
    Id,
    Email,
    PasswordHash,
    Name,
    FullName,
    Phone,
    Gender,
    DateOfBirth,
    Address,
    ProfileImage,
    ValidId,
    IsVerified,
    Role,
    PasswordResetToken,
    PasswordResetExpires,
    CreatedAt,
}

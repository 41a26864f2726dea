use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_uuid(Users::Id))
                    .col(string_uniq(Users::Username))
                    .col(string_uniq(Users::Email))
                    .col(string(Users::PasswordHash))
                    .col(string(Users::Avatar))
                    .col(string(Users::Bio))
                    .col(string(Users::Role))
                    .col(json_binary(Users::Social))
                    .col(boolean(Users::Verified))
                    .col(boolean(Users::Locked))
                    .col(timestamp_with_time_zone_null(Users::LastLoginAt))
                    .col(integer(Users::LoginAttempts))
                    .col(timestamp_with_time_zone(Users::CreatedAt))
                    .col(timestamp_with_time_zone(Users::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(pk_uuid(Categories::Id))
                    .col(string_uniq(Categories::Name))
                    .col(string_uniq(Categories::Slug))
                    .col(string(Categories::Description))
                    .col(string(Categories::Image))
                    .col(timestamp_with_time_zone(Categories::CreatedAt))
                    .col(timestamp_with_time_zone(Categories::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Posts::Table)
                    .if_not_exists()
                    .col(pk_uuid(Posts::Id))
                    .col(string(Posts::Title))
                    .col(string(Posts::Slug))
                    .col(string(Posts::Excerpt))
                    .col(text(Posts::Content))
                    .col(json_binary(Posts::Categories))
                    .col(json_binary(Posts::Tags))
                    .col(uuid(Posts::AuthorId))
                    .col(string(Posts::Status))
                    .col(timestamp_with_time_zone_null(Posts::PublishedAt))
                    .col(string(Posts::FeaturedImage))
                    .col(string(Posts::ReadTime))
                    .col(boolean(Posts::Featured))
                    .col(json_binary(Posts::Likes))
                    .col(big_integer(Posts::Views))
                    .col(big_integer(Posts::Comments))
                    .col(json_binary(Posts::Seo))
                    .col(timestamp_with_time_zone(Posts::CreatedAt))
                    .col(timestamp_with_time_zone(Posts::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_posts_author")
                            .from(Posts::Table, Posts::AuthorId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_posts_status")
                    .table(Posts::Table)
                    .col(Posts::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_posts_published_at")
                    .table(Posts::Table)
                    .col(Posts::PublishedAt)
                    .to_owned(),
            )
            .await?;

        // GIN indexes back the jsonb containment filters on tag and
        // category reference arrays.
        let conn = manager.get_connection();
        conn.execute_unprepared("CREATE INDEX idx_posts_tags ON posts USING GIN (tags)")
            .await?;
        conn.execute_unprepared("CREATE INDEX idx_posts_categories ON posts USING GIN (categories)")
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Posts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    Email,
    PasswordHash,
    Avatar,
    Bio,
    Role,
    Social,
    Verified,
    Locked,
    LastLoginAt,
    LoginAttempts,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Categories {
    Table,
    Id,
    Name,
    Slug,
    Description,
    Image,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Posts {
    Table,
    Id,
    Title,
    Slug,
    Excerpt,
    Content,
    Categories,
    Tags,
    AuthorId,
    Status,
    PublishedAt,
    FeaturedImage,
    ReadTime,
    Featured,
    Likes,
    Views,
    Comments,
    Seo,
    CreatedAt,
    UpdatedAt,
}

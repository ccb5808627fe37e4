use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // One review per (title, author). Concurrent creates race on this index.
        manager
            .create_index(
                Index::create()
                    .name("idx_reviews_title_author_unique")
                    .table(Reviews::Table)
                    .col(Reviews::TitleId)
                    .col(Reviews::AuthorId)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_genre_title_unique")
                    .table(GenreTitle::Table)
                    .col(GenreTitle::TitleId)
                    .col(GenreTitle::GenreId)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reviews_pub_date")
                    .table(Reviews::Table)
                    .col(Reviews::PubDate)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_comments_pub_date")
                    .table(Comments::Table)
                    .col(Comments::PubDate)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();

        for index in [
            "idx_comments_pub_date",
            "idx_reviews_pub_date",
            "idx_genre_title_unique",
            "idx_reviews_title_author_unique",
        ] {
            conn.execute_unprepared(&format!("DROP INDEX IF EXISTS {index}"))
                .await?;
        }

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Reviews {
    Table,
    TitleId,
    AuthorId,
    PubDate,
}

#[derive(DeriveIden)]
enum GenreTitle {
    Table,
    TitleId,
    GenreId,
}

#[derive(DeriveIden)]
enum Comments {
    Table,
    PubDate,
}

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Director::Table)
                    .if_not_exists()
                    .col(pk_auto(Director::Id))
                    .col(string_len_null(Director::Name, 255))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Genre::Table)
                    .if_not_exists()
                    .col(pk_auto(Genre::Id))
                    .col(string_len_null(Genre::Name, 255))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Movie::Table)
                    .if_not_exists()
                    .col(pk_auto(Movie::Id))
                    .col(string_len_null(Movie::Title, 255))
                    .col(string_len_null(Movie::Description, 255))
                    .col(string_len_null(Movie::Trailer, 255))
                    .col(integer_null(Movie::Year))
                    .col(double_null(Movie::Rating))
                    .col(integer_null(Movie::GenreId))
                    .col(integer_null(Movie::DirectorId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movie_genre")
                            .from(Movie::Table, Movie::GenreId)
                            .to(Genre::Table, Genre::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movie_director")
                            .from(Movie::Table, Movie::DirectorId)
                            .to(Director::Table, Director::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_movie_genre_id")
                    .table(Movie::Table)
                    .col(Movie::GenreId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_movie_director_id")
                    .table(Movie::Table)
                    .col(Movie::DirectorId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Movie::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Genre::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Director::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Movie {
    Table,
    Id,
    Title,
    Description,
    Trailer,
    Year,
    Rating,
    GenreId,
    DirectorId,
}

#[derive(DeriveIden)]
enum Director {
    Table,
    Id,
    Name,
}

#[derive(DeriveIden)]
enum Genre {
    Table,
    Id,
    Name,
}

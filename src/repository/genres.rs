use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set, TransactionTrait, sea_query::Expr,
};
use tracing::debug;

use crate::{
    entities::{genre, movie},
    error::AppResult,
    models::{NamedInput, NamedPatch},
};

#[derive(Clone)]
pub struct GenreRepository {
    db: DatabaseConnection,
}

impl GenreRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> AppResult<Vec<genre::Model>> {
        Ok(genre::Entity::find().order_by_asc(genre::Column::Id).all(&self.db).await?)
    }

    pub async fn get(&self, id: i32) -> AppResult<Option<genre::Model>> {
        Ok(genre::Entity::find_by_id(id).one(&self.db).await?)
    }

    pub async fn create(&self, input: NamedInput) -> AppResult<genre::Model> {
        let txn = self.db.begin().await?;
        let model = genre::ActiveModel { id: Default::default(), name: Set(input.name) }
            .insert(&txn)
            .await?;
        txn.commit().await?;

        debug!(genre_id = model.id, "created genre");
        Ok(model)
    }

    pub async fn replace(&self, id: i32, input: NamedInput) -> AppResult<Option<genre::Model>> {
        let txn = self.db.begin().await?;

        let Some(existing) = genre::Entity::find_by_id(id).one(&txn).await? else {
            return Ok(None);
        };
        let mut active = existing.into_active_model();
        active.name = Set(input.name);
        let model = active.update(&txn).await?;

        txn.commit().await?;

        debug!(genre_id = id, "replaced genre");
        Ok(Some(model))
    }

    pub async fn update(&self, id: i32, patch: NamedPatch) -> AppResult<Option<genre::Model>> {
        let Some(name) = patch.name else {
            return self.get(id).await;
        };
        self.replace(id, NamedInput { name }).await
    }

    pub async fn delete(&self, id: i32) -> AppResult<Option<genre::Model>> {
        let txn = self.db.begin().await?;

        let Some(existing) = genre::Entity::find_by_id(id).one(&txn).await? else {
            return Ok(None);
        };

        let detached = movie::Entity::update_many()
            .col_expr(movie::Column::GenreId, Expr::value(Option::<i32>::None))
            .filter(movie::Column::GenreId.eq(id))
            .exec(&txn)
            .await?;
        genre::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;

        debug!(genre_id = id, detached_movies = detached.rows_affected, "deleted genre");
        Ok(Some(existing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db::test_db, models::MovieInput, repository::MovieRepository};

    #[tokio::test]
    async fn list_is_in_store_order() {
        let genres = GenreRepository::new(test_db().await);
        for n in ["Western", "Noir", "Musical"] {
            genres.create(NamedInput { name: Some(n.to_string()) }).await.unwrap();
        }

        let names: Vec<_> =
            genres.list().await.unwrap().into_iter().filter_map(|g| g.name).collect();
        assert_eq!(names, ["Western", "Noir", "Musical"]);
    }

    #[tokio::test]
    async fn patch_with_null_clears_name() {
        let genres = GenreRepository::new(test_db().await);
        let created = genres.create(NamedInput { name: Some("Horror".into()) }).await.unwrap();

        let untouched = genres.update(created.id, NamedPatch::default()).await.unwrap().unwrap();
        assert_eq!(untouched.name.as_deref(), Some("Horror"));

        let cleared =
            genres.update(created.id, NamedPatch { name: Some(None) }).await.unwrap().unwrap();
        assert_eq!(cleared.name, None);
    }

    #[tokio::test]
    async fn delete_keeps_movies_without_genre() {
        let db = test_db().await;
        let genres = GenreRepository::new(db.clone());
        let movies = MovieRepository::new(db);

        let horror = genres.create(NamedInput { name: Some("Horror".into()) }).await.unwrap().id;
        let movie = movies
            .create(MovieInput {
                title: Some("Halloween".to_string()),
                genre_id: Some(horror),
                ..Default::default()
            })
            .await
            .unwrap();

        assert!(genres.delete(horror).await.unwrap().is_some());
        assert!(genres.delete(horror).await.unwrap().is_none());

        assert_eq!(movies.get(movie.id).await.unwrap().unwrap().genre_id, None);
        assert!(movies.list_by_genre(horror).await.unwrap().is_empty());
    }
}

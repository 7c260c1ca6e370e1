use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set, TransactionTrait, sea_query::Expr,
};
use tracing::debug;

use crate::{
    entities::{director, movie},
    error::AppResult,
    models::{NamedInput, NamedPatch},
};

#[derive(Clone)]
pub struct DirectorRepository {
    db: DatabaseConnection,
}

impl DirectorRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> AppResult<Vec<director::Model>> {
        Ok(director::Entity::find().order_by_asc(director::Column::Id).all(&self.db).await?)
    }

    pub async fn get(&self, id: i32) -> AppResult<Option<director::Model>> {
        Ok(director::Entity::find_by_id(id).one(&self.db).await?)
    }

    pub async fn create(&self, input: NamedInput) -> AppResult<director::Model> {
        let txn = self.db.begin().await?;
        let model = director::ActiveModel { id: Default::default(), name: Set(input.name) }
            .insert(&txn)
            .await?;
        txn.commit().await?;

        debug!(director_id = model.id, "created director");
        Ok(model)
    }

    pub async fn replace(&self, id: i32, input: NamedInput) -> AppResult<Option<director::Model>> {
        let txn = self.db.begin().await?;

        let Some(existing) = director::Entity::find_by_id(id).one(&txn).await? else {
            return Ok(None);
        };
        let mut active = existing.into_active_model();
        active.name = Set(input.name);
        let model = active.update(&txn).await?;

        txn.commit().await?;

        debug!(director_id = id, "replaced director");
        Ok(Some(model))
    }

    pub async fn update(&self, id: i32, patch: NamedPatch) -> AppResult<Option<director::Model>> {
        let Some(name) = patch.name else {
            return self.get(id).await;
        };
        self.replace(id, NamedInput { name }).await
    }

    /// Movies directed by `id` keep existing with `director_id` set to NULL.
    pub async fn delete(&self, id: i32) -> AppResult<Option<director::Model>> {
        let txn = self.db.begin().await?;

        let Some(existing) = director::Entity::find_by_id(id).one(&txn).await? else {
            return Ok(None);
        };

        let detached = movie::Entity::update_many()
            .col_expr(movie::Column::DirectorId, Expr::value(Option::<i32>::None))
            .filter(movie::Column::DirectorId.eq(id))
            .exec(&txn)
            .await?;
        director::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;

        debug!(director_id = id, detached_movies = detached.rows_affected, "deleted director");
        Ok(Some(existing))
    }
}

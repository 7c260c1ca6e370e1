use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, ModelTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::debug;

use crate::{
    entities::{director, genre, movie},
    error::{AppError, AppResult},
    models::{MovieFilter, MovieInput, MoviePatch, PAGE_SIZE},
};

pub type MovieWithRelations = (movie::Model, Option<genre::Model>, Option<director::Model>);

#[derive(Clone)]
pub struct MovieRepository {
    db: DatabaseConnection,
}

impl MovieRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list(&self, filter: MovieFilter) -> AppResult<Vec<movie::Model>> {
        let mut query = movie::Entity::find().order_by_asc(movie::Column::Id);

        if let Some(page) = filter.page {
            debug!(?page, "listing movie page");
            return Ok(query.offset(page.offset()).limit(PAGE_SIZE).all(&self.db).await?);
        }

        if let Some(director_id) = filter.director_id {
            query = query.filter(movie::Column::DirectorId.eq(director_id));
        }
        if let Some(genre_id) = filter.genre_id {
            query = query.filter(movie::Column::GenreId.eq(genre_id));
        }

        Ok(query.all(&self.db).await?)
    }

    pub async fn list_by_genre(&self, genre_id: i32) -> AppResult<Vec<movie::Model>> {
        self.list(MovieFilter::by_genre(genre_id)).await
    }

    pub async fn get(&self, id: i32) -> AppResult<Option<movie::Model>> {
        Ok(movie::Entity::find_by_id(id).one(&self.db).await?)
    }

    pub async fn get_detailed(&self, id: i32) -> AppResult<Option<MovieWithRelations>> {
        let Some(movie) = self.get(id).await? else {
            return Ok(None);
        };
        let genre = movie.find_related(genre::Entity).one(&self.db).await?;
        let director = movie.find_related(director::Entity).one(&self.db).await?;
        Ok(Some((movie, genre, director)))
    }

    pub async fn create(&self, input: MovieInput) -> AppResult<movie::Model> {
        let txn = self.db.begin().await?;

        ensure_references(&txn, input.genre_id, input.director_id).await?;

        let model = movie::ActiveModel {
            id: Default::default(),
            title: Set(input.title),
            description: Set(input.description),
            trailer: Set(input.trailer),
            year: Set(input.year),
            rating: Set(input.rating),
            genre_id: Set(input.genre_id),
            director_id: Set(input.director_id),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        debug!(movie_id = model.id, "created movie");
        Ok(model)
    }

    /// Overwrites every mutable column; fields missing from `input` become NULL.
    pub async fn replace(&self, id: i32, input: MovieInput) -> AppResult<Option<movie::Model>> {
        let txn = self.db.begin().await?;

        let Some(existing) = movie::Entity::find_by_id(id).one(&txn).await? else {
            return Ok(None);
        };
        ensure_references(&txn, input.genre_id, input.director_id).await?;

        let mut active = existing.into_active_model();
        active.title = Set(input.title);
        active.description = Set(input.description);
        active.trailer = Set(input.trailer);
        active.year = Set(input.year);
        active.rating = Set(input.rating);
        active.genre_id = Set(input.genre_id);
        active.director_id = Set(input.director_id);
        let model = active.update(&txn).await?;

        txn.commit().await?;

        debug!(movie_id = id, "replaced movie");
        Ok(Some(model))
    }

    /// Applies every field present in `patch` in a single update.
    pub async fn update(&self, id: i32, patch: MoviePatch) -> AppResult<Option<movie::Model>> {
        let txn = self.db.begin().await?;

        let Some(existing) = movie::Entity::find_by_id(id).one(&txn).await? else {
            return Ok(None);
        };
        if patch.is_empty() {
            return Ok(Some(existing));
        }
        ensure_references(&txn, patch.genre_id.flatten(), patch.director_id.flatten()).await?;

        let mut active = existing.into_active_model();
        if let Some(title) = patch.title {
            active.title = Set(title);
        }
        if let Some(description) = patch.description {
            active.description = Set(description);
        }
        if let Some(trailer) = patch.trailer {
            active.trailer = Set(trailer);
        }
        if let Some(year) = patch.year {
            active.year = Set(year);
        }
        if let Some(rating) = patch.rating {
            active.rating = Set(rating);
        }
        if let Some(genre_id) = patch.genre_id {
            active.genre_id = Set(genre_id);
        }
        if let Some(director_id) = patch.director_id {
            active.director_id = Set(director_id);
        }
        let model = active.update(&txn).await?;

        txn.commit().await?;

        debug!(movie_id = id, "updated movie");
        Ok(Some(model))
    }

    pub async fn delete(&self, id: i32) -> AppResult<Option<movie::Model>> {
        let txn = self.db.begin().await?;

        let Some(existing) = movie::Entity::find_by_id(id).one(&txn).await? else {
            return Ok(None);
        };
        movie::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;

        debug!(movie_id = id, "deleted movie");
        Ok(Some(existing))
    }
}

async fn ensure_references<C: ConnectionTrait>(
    conn: &C,
    genre_id: Option<i32>,
    director_id: Option<i32>,
) -> AppResult<()> {
    if let Some(id) = genre_id {
        if genre::Entity::find_by_id(id).one(conn).await?.is_none() {
            return Err(AppError::Validation(format!("genre {id} does not exist")));
        }
    }
    if let Some(id) = director_id {
        if director::Entity::find_by_id(id).one(conn).await?.is_none() {
            return Err(AppError::Validation(format!("director {id} does not exist")));
        }
    }
    Ok(())
}

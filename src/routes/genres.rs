use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;

use crate::{
    AppState,
    error::{AppError, AppResult},
    models::{GenreResponse, MovieResponse, NamedInput, NamedPatch},
};

type GenreId = WithRejection<Path<i32>, AppError>;

pub async fn list(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<GenreResponse>>> {
    let genres = state.genres.list().await?;
    Ok(Json(genres.into_iter().map(GenreResponse::from).collect()))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    WithRejection(Json(input), _): WithRejection<Json<NamedInput>, AppError>,
) -> AppResult<StatusCode> {
    input.validate()?;
    state.genres.create(input).await?;
    Ok(StatusCode::CREATED)
}

/// `GET /genres/{id}/` lists the movies filed under the genre.
pub async fn movies(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(id), _): GenreId,
) -> AppResult<Json<Vec<MovieResponse>>> {
    if state.genres.get(id).await?.is_none() {
        return Err(AppError::not_found("genre", id));
    }
    let movies = state.movies.list_by_genre(id).await?;
    Ok(Json(movies.into_iter().map(MovieResponse::from).collect()))
}

pub async fn replace(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(id), _): GenreId,
    WithRejection(Json(input), _): WithRejection<Json<NamedInput>, AppError>,
) -> AppResult<StatusCode> {
    input.validate()?;
    state.genres.replace(id, input).await?.ok_or_else(|| AppError::not_found("genre", id))?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(id), _): GenreId,
    WithRejection(Json(patch), _): WithRejection<Json<NamedPatch>, AppError>,
) -> AppResult<StatusCode> {
    patch.validate()?;
    state.genres.update(id, patch).await?.ok_or_else(|| AppError::not_found("genre", id))?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(id), _): GenreId,
) -> AppResult<StatusCode> {
    state.genres.delete(id).await?.ok_or_else(|| AppError::not_found("genre", id))?;
    Ok(StatusCode::NO_CONTENT)
}

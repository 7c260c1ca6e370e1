use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;

use crate::{
    AppState,
    error::{AppError, AppResult},
    models::{
        MovieDetailResponse, MovieFilter, MovieInput, MovieListQuery, MoviePatch, MovieResponse,
    },
};

type MovieId = WithRejection<Path<i32>, AppError>;

pub async fn list(
    State(state): State<Arc<AppState>>,
    WithRejection(Query(query), _): WithRejection<Query<MovieListQuery>, AppError>,
) -> AppResult<Json<Vec<MovieResponse>>> {
    let filter = MovieFilter::try_from(query)?;
    let movies = state.movies.list(filter).await?;
    Ok(Json(movies.into_iter().map(MovieResponse::from).collect()))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    WithRejection(Json(input), _): WithRejection<Json<MovieInput>, AppError>,
) -> AppResult<StatusCode> {
    input.validate()?;
    state.movies.create(input).await?;
    Ok(StatusCode::CREATED)
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(id), _): MovieId,
) -> AppResult<Json<MovieDetailResponse>> {
    let movie =
        state.movies.get_detailed(id).await?.ok_or_else(|| AppError::not_found("movie", id))?;
    Ok(Json(movie.into()))
}

pub async fn replace(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(id), _): MovieId,
    WithRejection(Json(input), _): WithRejection<Json<MovieInput>, AppError>,
) -> AppResult<StatusCode> {
    input.validate()?;
    state.movies.replace(id, input).await?.ok_or_else(|| AppError::not_found("movie", id))?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(id), _): MovieId,
    WithRejection(Json(patch), _): WithRejection<Json<MoviePatch>, AppError>,
) -> AppResult<StatusCode> {
    patch.validate()?;
    state.movies.update(id, patch).await?.ok_or_else(|| AppError::not_found("movie", id))?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(id), _): MovieId,
) -> AppResult<StatusCode> {
    state.movies.delete(id).await?.ok_or_else(|| AppError::not_found("movie", id))?;
    Ok(StatusCode::NO_CONTENT)
}

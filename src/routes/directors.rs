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
    models::{DirectorResponse, NamedInput, NamedPatch},
};

type DirectorId = WithRejection<Path<i32>, AppError>;

pub async fn list(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<DirectorResponse>>> {
    let directors = state.directors.list().await?;
    Ok(Json(directors.into_iter().map(DirectorResponse::from).collect()))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    WithRejection(Json(input), _): WithRejection<Json<NamedInput>, AppError>,
) -> AppResult<StatusCode> {
    input.validate()?;
    state.directors.create(input).await?;
    Ok(StatusCode::CREATED)
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(id), _): DirectorId,
) -> AppResult<Json<DirectorResponse>> {
    let director =
        state.directors.get(id).await?.ok_or_else(|| AppError::not_found("director", id))?;
    Ok(Json(director.into()))
}

pub async fn replace(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(id), _): DirectorId,
    WithRejection(Json(input), _): WithRejection<Json<NamedInput>, AppError>,
) -> AppResult<StatusCode> {
    input.validate()?;
    state.directors.replace(id, input).await?.ok_or_else(|| AppError::not_found("director", id))?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(id), _): DirectorId,
    WithRejection(Json(patch), _): WithRejection<Json<NamedPatch>, AppError>,
) -> AppResult<StatusCode> {
    patch.validate()?;
    state.directors.update(id, patch).await?.ok_or_else(|| AppError::not_found("director", id))?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(id), _): DirectorId,
) -> AppResult<StatusCode> {
    state.directors.delete(id).await?.ok_or_else(|| AppError::not_found("director", id))?;
    Ok(StatusCode::NO_CONTENT)
}

mod config;
mod db;
mod entities;
mod error;
mod models;
mod repository;
mod routes;

use std::sync::Arc;

use sea_orm::DatabaseConnection;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{
    config::Config,
    repository::{DirectorRepository, GenreRepository, MovieRepository},
};

#[derive(Clone)]
pub struct AppState {
    pub movies: MovieRepository,
    pub directors: DirectorRepository,
    pub genres: GenreRepository,
}

impl AppState {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            movies: MovieRepository::new(db.clone()),
            directors: DirectorRepository::new(db.clone()),
            genres: GenreRepository::new(db),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| config.default_log_filter().to_string()),
        )
        .init();

    let db = db::connect_and_migrate(&config.database_url).await?;
    let state = Arc::new(AppState::new(db));

    let app = routes::router(state)
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(CorsLayer::new().allow_origin(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, debug = config.debug, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}

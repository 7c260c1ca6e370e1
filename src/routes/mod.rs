mod directors;
mod genres;
mod movies;

use std::sync::Arc;

use axum::{Json, Router, http::Uri, routing::get};
use serde_json::{Value, json};

use crate::{AppState, error::AppError};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/movies/", get(movies::list).post(movies::create))
        .route(
            "/movies/{id}/",
            get(movies::get).put(movies::replace).patch(movies::update).delete(movies::delete),
        )
        .route("/directors/", get(directors::list).post(directors::create))
        .route(
            "/directors/{id}/",
            get(directors::get)
                .put(directors::replace)
                .patch(directors::update)
                .delete(directors::delete),
        )
        .route("/genres/", get(genres::list).post(genres::create))
        .route(
            "/genres/{id}/",
            get(genres::movies).put(genres::replace).patch(genres::update).delete(genres::delete),
        )
        .fallback(unmatched)
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn unmatched(uri: Uri) -> AppError {
    AppError::NotFound(format!("no resource at {}", uri.path()))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header::CONTENT_TYPE},
    };
    use tower::ServiceExt;

    use super::*;
    use crate::db::test_db;

    async fn app() -> Router {
        router(Arc::new(AppState::new(test_db().await)))
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let req = Request::builder().method(method).uri(uri);
        let req = match body {
            Some(body) => req
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => req.body(Body::empty()).unwrap(),
        };

        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body =
            if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
        (status, body)
    }

    async fn last_id(app: &Router, collection: &str) -> i64 {
        let (_, list) = send(app, "GET", collection, None).await;
        list.as_array().and_then(|items| items.last()).unwrap()["id"].as_i64().unwrap()
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let app = app().await;
        let (status, body) = send(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn genre_lists_movies_created_under_it() {
        let app = app().await;

        let horror = json!({ "name": "Horror" });
        let (status, body) = send(&app, "POST", "/genres/", Some(horror)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(body.is_null());
        let genre_id = last_id(&app, "/genres/").await;

        let movie = json!({
            "title": "X",
            "description": "A farmhouse, a film crew",
            "trailer": "https://example.com/x",
            "year": "2022",
            "rating": 6.6,
            "genre_id": genre_id,
        });
        let (status, _) = send(&app, "POST", "/movies/", Some(movie)).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(&app, "GET", &format!("/genres/{genre_id}/"), None).await;
        assert_eq!(status, StatusCode::OK);
        let movies = body.as_array().unwrap();
        assert_eq!(movies.len(), 1);
        assert_eq!(movies[0]["title"], "X");
        assert_eq!(movies[0]["year"], "2022");
        assert_eq!(movies[0]["genre_id"], genre_id);
    }

    #[tokio::test]
    async fn movie_detail_nests_relations_and_delete_yields_404() {
        let app = app().await;
        send(&app, "POST", "/directors/", Some(json!({ "name": "Ti West" }))).await;
        let director_id = last_id(&app, "/directors/").await;

        let pearl = json!({ "title": "Pearl", "director_id": director_id });
        send(&app, "POST", "/movies/", Some(pearl)).await;
        let movie_id = last_id(&app, "/movies/").await;
        let uri = format!("/movies/{movie_id}/");

        let (status, body) = send(&app, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], movie_id);
        assert_eq!(body["director"], json!({ "id": director_id, "name": "Ti West" }));
        assert!(body["genre"].is_null());

        let (status, body) = send(&app, "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(body.is_null());

        let (status, body) = send(&app, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": format!("movie {movie_id} not found") }));

        let (status, _) = send(&app, "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn list_filters_and_pages() {
        let app = app().await;
        send(&app, "POST", "/directors/", Some(json!({ "name": "A" }))).await;
        let director_id = last_id(&app, "/directors/").await;

        for n in 0..12 {
            let mut movie = json!({ "title": format!("M{n}") });
            if n % 3 == 0 {
                movie["director_id"] = json!(director_id);
            }
            send(&app, "POST", "/movies/", Some(movie)).await;
        }

        let (status, body) =
            send(&app, "GET", &format!("/movies/?director_id={director_id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        let rows = body.as_array().unwrap();
        assert_eq!(rows.len(), 4);
        assert!(rows.iter().all(|m| m["director_id"] == director_id));

        let (_, body) = send(&app, "GET", "/movies/?director_id=999", None).await;
        assert_eq!(body, json!([]));

        let (_, body) = send(&app, "GET", "/movies/?page=1", None).await;
        assert_eq!(body.as_array().unwrap().len(), 10);

        let (_, body) = send(&app, "GET", "/movies/?page=2", None).await;
        let second = body.as_array().unwrap();
        assert_eq!(second.len(), 2);
        assert_eq!(second[0]["title"], "M10");

        let (status, body) = send(&app, "GET", "/movies/?page=3", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("page"));

        let (status, _) = send(&app, "GET", "/movies/?genre_id=abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) =
            send(&app, "GET", &format!("/movies/?page=1&director_id={director_id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        let first = body.as_array().unwrap();
        assert_eq!(first.len(), 10);
        assert_eq!(first[1]["title"], "M1");

        let (status, body) = send(&app, "GET", "/movies/?page=2&director_id=abc", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 2);

        for page in ["%201", "1%20", "%20%20"] {
            let (status, body) = send(&app, "GET", &format!("/movies/?page={page}"), None).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{page}");
            assert!(body["error"].as_str().unwrap().starts_with("unsupported page"));
        }
    }

    #[tokio::test]
    async fn unmatched_paths_get_json_not_found() {
        let app = app().await;
        for uri in ["/movies", "/movies/1", "/nope"] {
            let (status, body) = send(&app, "GET", uri, None).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
            assert_eq!(body, json!({ "error": format!("no resource at {uri}") }));
        }
    }

    #[tokio::test]
    async fn patch_applies_all_fields_and_put_clears_omitted() {
        let app = app().await;
        let movie = json!({ "title": "Old", "description": "d", "year": 1990, "rating": 5.0 });
        send(&app, "POST", "/movies/", Some(movie)).await;
        let id = last_id(&app, "/movies/").await;
        let uri = format!("/movies/{id}/");

        let patch = json!({ "title": "New", "rating": 7.5, "year": "1991" });
        let (status, _) = send(&app, "PATCH", &uri, Some(patch)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, body) = send(&app, "GET", &uri, None).await;
        assert_eq!(body["title"], "New");
        assert_eq!(body["rating"], 7.5);
        assert_eq!(body["year"], "1991");
        assert_eq!(body["description"], "d");

        let (status, _) = send(&app, "PUT", &uri, Some(json!({ "title": "Only" }))).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, body) = send(&app, "GET", &uri, None).await;
        assert_eq!(body["title"], "Only");
        assert!(body["description"].is_null());
        assert!(body["year"].is_null());
        assert!(body["rating"].is_null());

        let (status, _) = send(&app, "PATCH", "/movies/999/", Some(json!({ "title": "?" }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn directors_and_genres_support_full_crud() {
        let app = app().await;
        for collection in ["directors", "genres"] {
            let one = json!({ "name": "one" });
            let (status, _) = send(&app, "POST", &format!("/{collection}/"), Some(one)).await;
            assert_eq!(status, StatusCode::CREATED);
            let id = last_id(&app, &format!("/{collection}/")).await;
            let uri = format!("/{collection}/{id}/");

            let (status, _) = send(&app, "PUT", &uri, Some(json!({ "name": "two" }))).await;
            assert_eq!(status, StatusCode::NO_CONTENT);
            let (status, _) = send(&app, "PATCH", &uri, Some(json!({ "name": "three" }))).await;
            assert_eq!(status, StatusCode::NO_CONTENT);

            let (_, list) = send(&app, "GET", &format!("/{collection}/"), None).await;
            assert_eq!(list, json!([{ "id": id, "name": "three" }]));

            let (status, _) = send(&app, "DELETE", &uri, None).await;
            assert_eq!(status, StatusCode::NO_CONTENT);
            let (status, _) = send(&app, "PUT", &uri, Some(json!({ "name": "gone" }))).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
        }

        let (status, body) = send(&app, "GET", "/directors/77/", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "director 77 not found");

        let (status, _) = send(&app, "GET", "/genres/77/", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn bad_requests_are_reported_as_json() {
        let app = app().await;

        let (status, body) = send(&app, "GET", "/movies/abc/", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].is_string());

        let bad_rating = json!({ "rating": "high" });
        let (status, body) = send(&app, "POST", "/movies/", Some(bad_rating)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let (status, _) = send(&app, "POST", "/movies/", Some(json!({ "genre_id": 12 }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let long_name = "n".repeat(300);
        let (status, _) = send(&app, "POST", "/genres/", Some(json!({ "name": long_name }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, list) = send(&app, "GET", "/movies/", None).await;
        assert_eq!(list, json!([]));
    }
}

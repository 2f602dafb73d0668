// HTTP surface: one router over the application use cases. Every request
// gets its own unit of work from the state factory.

pub mod cities;
pub mod error;
pub mod persons;
pub mod phone_numbers;
pub mod relations;

use axum::extract::Request;
use axum::http::header;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post, put};
use axum::Router;
use person_registry_application::files::FileManager;
use person_registry_domain::unit_of_work::UnitOfWork;
use person_registry_infrastructure::files::LocalFileManager;
use person_registry_infrastructure::persistence::PgUnitOfWork;
use serde::Serialize;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::debug;

/// Builds the unit of work for one request.
pub type UnitOfWorkFactory = Arc<dyn Fn() -> Arc<dyn UnitOfWork> + Send + Sync>;

#[derive(Clone)]
pub struct AppState {
    pub uow: UnitOfWorkFactory,
    pub files: Arc<dyn FileManager>,
}

impl AppState {
    pub fn postgres(pool: PgPool, photo_dir: impl Into<std::path::PathBuf>) -> Self {
        Self {
            uow: Arc::new(move || Arc::new(PgUnitOfWork::new(pool.clone()))),
            files: Arc::new(LocalFileManager::new(photo_dir)),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct IdResponse {
    pub id: i32,
}

pub(crate) fn default_page_number() -> i64 {
    1
}

pub(crate) fn default_page_size() -> i64 {
    10
}

/// Records the caller's preferred language on the request trace. Error
/// messages stay in English; the header is kept for clients that localize.
async fn track_language(request: Request, next: Next) -> Response {
    if let Some(language) = request
        .headers()
        .get(header::ACCEPT_LANGUAGE)
        .and_then(|value| value.to_str().ok())
    {
        debug!(language, "request language");
    }
    next.run(request).await
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/v1/cities",
            post(cities::create_city).get(cities::list_cities),
        )
        .route(
            "/api/v1/cities/{id}",
            put(cities::update_city).delete(cities::delete_city),
        )
        .route(
            "/api/v1/persons",
            post(persons::create_person).get(persons::list_persons),
        )
        .route(
            "/api/v1/persons/relation-report",
            get(persons::relation_report),
        )
        .route(
            "/api/v1/persons/{id}",
            get(persons::get_person)
                .put(persons::update_person)
                .delete(persons::delete_person),
        )
        .route(
            "/api/v1/persons/{id}/photo",
            post(persons::upload_photo)
                .get(persons::download_photo)
                .delete(persons::delete_photo),
        )
        .route(
            "/api/v1/persons/{id}/phone-numbers",
            post(phone_numbers::create_phone_number),
        )
        .route(
            "/api/v1/persons/{person_id}/phone-numbers/{phone_number_id}",
            put(phone_numbers::update_phone_number).delete(phone_numbers::delete_phone_number),
        )
        .route(
            "/api/v1/person-relations",
            post(relations::create_relation).delete(relations::delete_relation),
        )
        .layer(middleware::from_fn(track_language))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use person_registry_application::test_support::{InMemoryUnitOfWork, RecordingFileManager};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn test_router() -> Router {
        let uow = InMemoryUnitOfWork::new();
        let state = AppState {
            uow: Arc::new(move || Arc::new(uow.clone())),
            files: Arc::new(RecordingFileManager::new()),
        };
        router(state)
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = match body {
            Some(body) => Request::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    async fn create_city(app: &Router, name: &str) -> i32 {
        let (status, body) =
            send(app, "POST", "/api/v1/cities", Some(json!({ "name": name }))).await;
        assert_eq!(status, StatusCode::OK);
        body["id"].as_i64().unwrap() as i32
    }

    async fn create_person(app: &Router, city_id: i32, personal_number: &str) -> i32 {
        let (status, body) = send(
            app,
            "POST",
            "/api/v1/persons",
            Some(json!({
                "name": "Nino",
                "last_name": "Beridze",
                "personal_number": personal_number,
                "birth_date": "1990-04-12",
                "gender": 2,
                "city_id": city_id
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        body["id"].as_i64().unwrap() as i32
    }

    #[tokio::test]
    async fn duplicate_city_maps_to_conflict() {
        let app = test_router();
        create_city(&app, "Tbilisi").await;

        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/cities",
            Some(json!({ "name": " tbilisi " })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["error"].as_str().unwrap().contains("already exists"));
    }

    #[tokio::test]
    async fn invalid_body_maps_to_bad_request_with_details() {
        let app = test_router();
        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/cities",
            Some(json!({ "name": "   " })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["details"].as_array().is_some());
    }

    #[tokio::test]
    async fn person_lifecycle_over_http() {
        let app = test_router();
        let city_id = create_city(&app, "Batumi").await;
        let person_id = create_person(&app, city_id, "01001054321").await;

        let (status, details) =
            send(&app, "GET", &format!("/api/v1/persons/{person_id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(details["name"], "Nino");
        assert_eq!(details["city"], "Batumi");
        assert!(details["photo"].is_null());

        let (status, _) = send(
            &app,
            "PUT",
            &format!("/api/v1/persons/{person_id}"),
            Some(json!({
                "name": "Mariam",
                "last_name": "Beridze",
                "personal_number": "01001054321",
                "birth_date": "1990-04-12",
                "gender": 2,
                "city_id": city_id
            })),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(&app, "DELETE", &format!("/api/v1/persons/{person_id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(&app, "GET", &format!("/api/v1/persons/{person_id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn list_persons_defaults_paging() {
        let app = test_router();
        let city_id = create_city(&app, "Kutaisi").await;
        create_person(&app, city_id, "01001054321").await;
        create_person(&app, city_id, "01001054322").await;

        let (status, body) = send(
            &app,
            "GET",
            &format!("/api/v1/persons?city_id={city_id}"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_count"], 2);
        assert_eq!(body["page_number"], 1);
        assert_eq!(body["page_size"], 10);
        assert_eq!(body["items"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn phone_numbers_and_relations_over_http() {
        let app = test_router();
        let city_id = create_city(&app, "Tbilisi").await;
        let a = create_person(&app, city_id, "01001054321").await;
        let b = create_person(&app, city_id, "01001054322").await;

        let (status, body) = send(
            &app,
            "POST",
            &format!("/api/v1/persons/{a}/phone-numbers"),
            Some(json!({ "phone_number_type_id": 1, "phone_number": "599000111" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["id"].as_i64().unwrap() > 0);

        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/person-relations",
            Some(json!({
                "person_id": a,
                "related_person_id": b,
                "relation_type_id": 1
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["id"].as_i64().unwrap() > 0);

        let (status, report) = send(&app, "GET", "/api/v1/persons/relation-report", None).await;
        assert_eq!(status, StatusCode::OK);
        let rows = report.as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["relation_type"], "Colleague");
        assert_eq!(rows[0]["relation_count"], 1);

        let (status, _) = send(
            &app,
            "DELETE",
            "/api/v1/person-relations",
            Some(json!({
                "person_id": a,
                "related_person_id": b,
                "relation_type_id": 1
            })),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn photo_upload_and_download_round_trip() {
        let app = test_router();
        let city_id = create_city(&app, "Tbilisi").await;
        let person_id = create_person(&app, city_id, "01001054321").await;

        let upload = Request::builder()
            .method("POST")
            .uri(format!("/api/v1/persons/{person_id}/photo?file_name=nino.jpg"))
            .header("content-type", "application/octet-stream")
            .body(Body::from(vec![0xFF, 0xD8, 0xFF]))
            .unwrap();
        let response = app.clone().oneshot(upload).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let download = Request::builder()
            .uri(format!("/api/v1/persons/{person_id}/photo"))
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(download).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(bytes.as_ref(), &[0xFF, 0xD8, 0xFF]);

        let (status, _) = send(
            &app,
            "DELETE",
            &format!("/api/v1/persons/{person_id}/photo"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(
            &app,
            "GET",
            &format!("/api/v1/persons/{person_id}/photo"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}

use std::path::Path;

use axum::Router;
use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Request, StatusCode};
use http_body_util::BodyExt;
use lessonbook::router::init_router;
use lessonbook::state::AppState;
use lessonbook_config::{BackupConfig, CorsConfig, ExportConfig};
use serde_json::{Value, json};
use sqlx::SqlitePool;
use tower::ServiceExt;

/// State over the test pool; backups and snapshots go under `dir`.
#[allow(dead_code)]
pub fn test_state(pool: SqlitePool, dir: &Path) -> AppState {
    AppState {
        db: pool,
        cors_config: CorsConfig::from_env(),
        backup_config: BackupConfig {
            database_path: None,
            backup_dir: dir.join("backups"),
            retention: 3,
            host: "test".to_string(),
        },
        export_config: ExportConfig {
            json_backup_dir: dir.join("json"),
        },
    }
}

#[allow(dead_code)]
pub fn setup_test_app(pool: SqlitePool) -> Router {
    dotenvy::dotenv().ok();
    init_router(test_state(pool, &std::env::temp_dir().join("lessonbook-tests")))
}

#[allow(dead_code)]
pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

#[allow(dead_code)]
pub fn text_request(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "text/csv")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[allow(dead_code)]
pub fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Sends the request and reads the raw body.
#[allow(dead_code)]
pub async fn send_raw(app: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, Bytes) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, headers, body)
}

/// Sends the request and parses the body as JSON (`Null` when empty).
#[allow(dead_code)]
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, _, body) = send_raw(app, request).await;
    let value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, value)
}

#[allow(dead_code)]
pub async fn create_school_year(app: &Router, name: &str, start: &str, end: &str) -> i64 {
    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/api/school-years",
            json!({ "name": name, "start_date": start, "end_date": end }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_i64().unwrap()
}

/// Class with lessons on Monday (2) and Wednesday (1).
#[allow(dead_code)]
pub async fn create_class(app: &Router, school_year_id: i64, name: &str) -> i64 {
    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/api/classes",
            json!({
                "school_year_id": school_year_id,
                "name": name,
                "load_monday": 2,
                "load_wednesday": 1
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_i64().unwrap()
}

#[allow(dead_code)]
pub async fn create_student(app: &Router, class_id: i64, number: i64, name: &str) -> i64 {
    let (status, body) = send(
        app,
        json_request(
            "POST",
            &format!("/api/classes/{class_id}/students"),
            json!({ "number": number, "name": name }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_i64().unwrap()
}

/// Two weeks from Monday 2025-09-15 with a generated calendar for one class.
#[allow(dead_code)]
pub async fn generated_class(app: &Router) -> (i64, i64) {
    let year_id = create_school_year(app, "2025/2026", "2025-09-15", "2025-09-26").await;
    let class_id = create_class(app, year_id, "10.º B").await;
    let (status, body) = send(
        app,
        empty_request("POST", &format!("/api/classes/{class_id}/calendar/generate")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    (year_id, class_id)
}

/// Live calendar entries of a class, in date order.
#[allow(dead_code)]
pub async fn entries(app: &Router, class_id: i64) -> Vec<Value> {
    let (status, body) = send(
        app,
        empty_request("GET", &format!("/api/classes/{class_id}/calendar")),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body.as_array().cloned().unwrap_or_default()
}

mod common;

use axum::http::{StatusCode, header};
use common::{create_class, create_school_year, empty_request, send, send_raw, test_state};
use lessonbook::router::init_router;
use sqlx::SqlitePool;
use tempfile::TempDir;

#[sqlx::test(migrations = "./migrations")]
async fn test_listing_without_backups(pool: SqlitePool) {
    let dir = TempDir::new().unwrap();
    let app = init_router(test_state(pool, dir.path()));

    let (status, body) = send(&app, empty_request("GET", "/api/backups")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["backups"].as_array().unwrap().len(), 0);
    assert!(body["latest"].is_null());
    assert_eq!(body["retention"], 3);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_download_existing_backup(pool: SqlitePool) {
    let dir = TempDir::new().unwrap();
    let backups = dir.path().join("backups");
    tokio::fs::create_dir_all(&backups).await.unwrap();
    tokio::fs::write(backups.join("backup-20250915-080000-000-test.db"), b"SQLite format 3")
        .await
        .unwrap();
    let app = init_router(test_state(pool, dir.path()));

    let (status, body) = send(&app, empty_request("GET", "/api/backups")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["latest"]["name"], "backup-20250915-080000-000-test.db");

    let (status, headers, bytes) = send_raw(
        &app,
        empty_request("GET", "/api/backups/backup-20250915-080000-000-test.db"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "application/vnd.sqlite3");
    assert_eq!(&bytes[..], b"SQLite format 3");

    let (status, _) = send(&app, empty_request("GET", "/api/backups/lessonbook.db")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_json_snapshot_writes_class_files(pool: SqlitePool) {
    let dir = TempDir::new().unwrap();
    let app = init_router(test_state(pool, dir.path()));
    let year_id = create_school_year(&app, "2025/2026", "2025-09-15", "2025-09-26").await;
    create_class(&app, year_id, "10.º B").await;

    let (status, body) = send(&app, empty_request("POST", "/api/backups/json")).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let files = body["files"].as_array().unwrap();
    assert_eq!(files.len(), 1);

    let name = files[0].as_str().unwrap();
    let contents = tokio::fs::read_to_string(dir.path().join("json").join(name))
        .await
        .unwrap();
    let snapshot: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(snapshot["turma"]["nome"], "10.º B");
    assert!(snapshot["aulas"].as_array().unwrap().is_empty());
}

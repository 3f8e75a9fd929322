mod common;

use axum::http::StatusCode;
use common::{create_class, create_school_year, empty_request, json_request, send, setup_test_app};
use serde_json::json;
use sqlx::SqlitePool;

#[sqlx::test(migrations = "./migrations")]
async fn test_create_and_list_school_years(pool: SqlitePool) {
    let app = setup_test_app(pool);
    create_school_year(&app, "2024/2025", "2024-09-12", "2025-06-30").await;
    create_school_year(&app, "2025/2026", "2025-09-12", "2026-06-30").await;

    let (status, body) = send(&app, empty_request("GET", "/api/school-years")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], 2);
    assert_eq!(body["data"][0]["name"], "2025/2026");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_duplicate_name_is_rejected(pool: SqlitePool) {
    let app = setup_test_app(pool);
    create_school_year(&app, "2025/2026", "2025-09-12", "2026-06-30").await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/school-years",
            json!({ "name": "2025/2026", "start_date": "2025-09-15", "end_date": "2026-06-30" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("already exists"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_end_before_start_fails_validation(pool: SqlitePool) {
    let app = setup_test_app(pool);

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/school-years",
            json!({ "name": "2025/2026", "start_date": "2026-06-30", "end_date": "2025-09-12" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_activation_keeps_a_single_active_year(pool: SqlitePool) {
    let app = setup_test_app(pool);
    let first = create_school_year(&app, "2024/2025", "2024-09-12", "2025-06-30").await;
    let second = create_school_year(&app, "2025/2026", "2025-09-12", "2026-06-30").await;

    for id in [first, second] {
        let (status, body) = send(
            &app,
            empty_request("POST", &format!("/api/school-years/{id}/activate")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["is_active"], true);
    }

    let (status, body) = send(&app, empty_request("GET", "/api/school-years/active")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], second);

    let (_, body) = send(&app, empty_request("GET", "/api/school-years?is_active=true")).await;
    assert_eq!(body["meta"]["total"], 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_no_active_year_is_not_found(pool: SqlitePool) {
    let app = setup_test_app(pool);

    let (status, _) = send(&app, empty_request("GET", "/api/school-years/active")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_closed_year_blocks_writes_until_reopened(pool: SqlitePool) {
    let app = setup_test_app(pool);
    let year_id = create_school_year(&app, "2025/2026", "2025-09-12", "2026-06-30").await;

    let (status, body) = send(
        &app,
        empty_request("POST", &format!("/api/school-years/{year_id}/close")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_closed"], true);

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/classes",
            json!({ "school_year_id": year_id, "name": "10.º A" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("closed"));

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            &format!("/api/school-years/{year_id}/holidays"),
            json!({ "date": "2025-10-06", "name": "Feriado municipal" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        empty_request("POST", &format!("/api/school-years/{year_id}/reopen")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    create_class(&app, year_id, "10.º A").await;
}

#[sqlx::test(migrations = "./migrations")]
async fn test_interruption_from_text_and_school_calendar(pool: SqlitePool) {
    let app = setup_test_app(pool);
    let year_id = create_school_year(&app, "2025/2026", "2025-09-12", "2026-06-30").await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            &format!("/api/school-years/{year_id}/interruptions"),
            json!({
                "kind": "carnaval",
                "date_text": "16 e 17 de fevereiro de 2026",
                "description": "Carnaval"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            &format!("/api/school-years/{year_id}/interruptions"),
            json!({ "date_text": "31 de fevereiro de 2026" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{body}");

    let (status, body) = send(
        &app,
        empty_request("POST", &format!("/api/school-years/{year_id}/holidays/national")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(!body.as_array().unwrap().is_empty());

    let (status, body) = send(
        &app,
        empty_request("GET", &format!("/api/school-calendar?school_year_id={year_id}")),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["interruptions"][0]["days"].as_array().unwrap().len(), 2);
}
